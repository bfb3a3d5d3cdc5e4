//! Validated configuration for the built-in task kinds.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::errors::{DomainError, DomainResult};

/// Checkpoint written by a relaxation; holds the latest structure.
pub const CHECKPOINT_FILE: &str = "CONTCAR";

/// Structure input read by a run.
pub const STRUCTURE_INPUT_FILE: &str = "POSCAR";

/// Primary output artifact inspected by the convergence diagnostic.
pub const PRIMARY_OUTPUT_FILE: &str = "vasprun.xml";

/// Sentinel selecting every file of the previous run directory.
pub const ALL_FILES_SENTINEL: &str = "$ALL";

const DEFAULT_COPY_FILES: [&str; 8] = [
    "INCAR",
    "POSCAR",
    "KPOINTS",
    "POTCAR",
    "OUTCAR",
    "vasprun.xml",
    "CHGCAR",
    "OSZICAR",
];

/// Which artifacts to copy from a previous run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactSelection {
    /// Every file in the previous run directory.
    All,
    /// The named files, copied in order.
    Named(Vec<String>),
}

/// Configuration of the copy task.
///
/// Built only through [`CopyConfig::new`], including when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCopyConfig", into = "RawCopyConfig")]
pub struct CopyConfig {
    files: ArtifactSelection,
    use_checkpoint: bool,
}

impl CopyConfig {
    /// Validate and build a copy configuration.
    ///
    /// Without an explicit file list the default artifact set is copied,
    /// with [`CHECKPOINT_FILE`] appended when `use_checkpoint` is set.
    /// A list containing [`ALL_FILES_SENTINEL`] selects the whole directory.
    pub fn new(files: Option<Vec<String>>, use_checkpoint: bool) -> DomainResult<Self> {
        let files = match files {
            None => {
                let mut names: Vec<String> =
                    DEFAULT_COPY_FILES.iter().map(ToString::to_string).collect();
                if use_checkpoint {
                    names.push(CHECKPOINT_FILE.to_string());
                }
                ArtifactSelection::Named(names)
            }
            Some(names) if names.iter().any(|n| n == ALL_FILES_SENTINEL) => ArtifactSelection::All,
            Some(names) => {
                if names.is_empty() {
                    return Err(DomainError::InvalidTaskConfig(
                        "copy file list cannot be empty".to_string(),
                    ));
                }
                if let Some(bad) = names
                    .iter()
                    .find(|n| n.is_empty() || n.contains('/') || n.contains('\\') || *n == "..")
                {
                    return Err(DomainError::InvalidTaskConfig(format!(
                        "copy file name must be a bare file name: {bad:?}"
                    )));
                }
                ArtifactSelection::Named(names)
            }
        };

        Ok(Self {
            files,
            use_checkpoint,
        })
    }

    pub const fn files(&self) -> &ArtifactSelection {
        &self.files
    }

    pub const fn use_checkpoint(&self) -> bool {
        self.use_checkpoint
    }

    /// Name under which `file` lands in the working directory.
    ///
    /// The checkpoint becomes the structure input when the override is on;
    /// every other file keeps its name.
    pub fn destination_name<'a>(&self, file: &'a str) -> &'a str {
        if self.use_checkpoint && file == CHECKPOINT_FILE {
            STRUCTURE_INPUT_FILE
        } else {
            file
        }
    }
}

impl Default for CopyConfig {
    fn default() -> Self {
        let mut names: Vec<String> = DEFAULT_COPY_FILES.iter().map(ToString::to_string).collect();
        names.push(CHECKPOINT_FILE.to_string());
        Self {
            files: ArtifactSelection::Named(names),
            use_checkpoint: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCopyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    files: Option<Vec<String>>,
    #[serde(default = "default_use_checkpoint")]
    use_checkpoint: bool,
}

const fn default_use_checkpoint() -> bool {
    true
}

impl TryFrom<RawCopyConfig> for CopyConfig {
    type Error = DomainError;

    fn try_from(raw: RawCopyConfig) -> Result<Self, Self::Error> {
        Self::new(raw.files, raw.use_checkpoint)
    }
}

impl From<CopyConfig> for RawCopyConfig {
    fn from(config: CopyConfig) -> Self {
        let files = match config.files {
            ArtifactSelection::All => vec![ALL_FILES_SENTINEL.to_string()],
            ArtifactSelection::Named(names) => names,
        };
        Self {
            files: Some(files),
            use_checkpoint: config.use_checkpoint,
        }
    }
}

/// Options forwarded to assimilation by the ingest task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawIngestConfig", into = "RawIngestConfig")]
pub struct IngestConfig {
    parse_uniform: bool,
    update_duplicates: bool,
    additional_fields: Map<String, Value>,
}

impl IngestConfig {
    pub fn new(
        parse_uniform: bool,
        update_duplicates: bool,
        additional_fields: Map<String, Value>,
    ) -> DomainResult<Self> {
        if additional_fields.keys().any(String::is_empty) {
            return Err(DomainError::InvalidTaskConfig(
                "additional field names cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            parse_uniform,
            update_duplicates,
            additional_fields,
        })
    }

    /// Parse the uniform-mesh density of states.
    pub const fn parse_uniform(&self) -> bool {
        self.parse_uniform
    }

    /// Overwrite an existing document for the same run.
    pub const fn update_duplicates(&self) -> bool {
        self.update_duplicates
    }

    /// Extra fields stored alongside the ingested document.
    pub const fn additional_fields(&self) -> &Map<String, Value> {
        &self.additional_fields
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawIngestConfig {
    #[serde(default)]
    parse_uniform: bool,
    #[serde(default)]
    update_duplicates: bool,
    #[serde(default)]
    additional_fields: Map<String, Value>,
}

impl TryFrom<RawIngestConfig> for IngestConfig {
    type Error = DomainError;

    fn try_from(raw: RawIngestConfig) -> Result<Self, Self::Error> {
        Self::new(raw.parse_uniform, raw.update_duplicates, raw.additional_fields)
    }
}

impl From<IngestConfig> for RawIngestConfig {
    fn from(config: IngestConfig) -> Self {
        Self {
            parse_uniform: config.parse_uniform,
            update_duplicates: config.update_duplicates,
            additional_fields: config.additional_fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(selection: &ArtifactSelection) -> Vec<&str> {
        match selection {
            ArtifactSelection::Named(n) => n.iter().map(String::as_str).collect(),
            ArtifactSelection::All => panic!("expected named selection"),
        }
    }

    #[test]
    fn test_default_files_include_checkpoint_when_enabled() {
        let config = CopyConfig::new(None, true).unwrap();
        let files = names(config.files());
        assert_eq!(files.len(), 9);
        assert_eq!(files.last(), Some(&CHECKPOINT_FILE));

        let config = CopyConfig::new(None, false).unwrap();
        assert!(!names(config.files()).contains(&CHECKPOINT_FILE));
    }

    #[test]
    fn test_explicit_list_is_kept_verbatim() {
        let config =
            CopyConfig::new(Some(vec!["INCAR".to_string(), "CONTCAR".to_string()]), true).unwrap();
        assert_eq!(names(config.files()), vec!["INCAR", "CONTCAR"]);
    }

    #[test]
    fn test_all_sentinel() {
        let config = CopyConfig::new(Some(vec![ALL_FILES_SENTINEL.to_string()]), false).unwrap();
        assert_eq!(config.files(), &ArtifactSelection::All);
    }

    #[test]
    fn test_checkpoint_override_rule() {
        let on = CopyConfig::new(Some(vec!["CONTCAR".to_string()]), true).unwrap();
        assert_eq!(on.destination_name("CONTCAR"), STRUCTURE_INPUT_FILE);
        assert_eq!(on.destination_name("INCAR"), "INCAR");

        let off = CopyConfig::new(Some(vec!["CONTCAR".to_string()]), false).unwrap();
        assert_eq!(off.destination_name("CONTCAR"), "CONTCAR");
    }

    #[test]
    fn test_rejects_bad_file_names() {
        assert!(CopyConfig::new(Some(vec![]), true).is_err());
        assert!(CopyConfig::new(Some(vec!["../INCAR".to_string()]), true).is_err());
        assert!(CopyConfig::new(Some(vec![String::new()]), true).is_err());
    }

    #[test]
    fn test_copy_config_deserialize_validates() {
        let config: CopyConfig =
            serde_json::from_value(json!({ "files": ["INCAR"], "use_checkpoint": false })).unwrap();
        assert_eq!(names(config.files()), vec!["INCAR"]);

        let defaulted: CopyConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(defaulted, CopyConfig::default());

        assert!(serde_json::from_value::<CopyConfig>(json!({ "files": ["a/b"] })).is_err());
    }

    #[test]
    fn test_ingest_config_rejects_empty_field_name() {
        let mut fields = Map::new();
        fields.insert(String::new(), json!(1));
        assert!(IngestConfig::new(false, false, fields).is_err());

        let config: IngestConfig =
            serde_json::from_value(json!({ "parse_uniform": true })).unwrap();
        assert!(config.parse_uniform());
        assert!(!config.update_duplicates());
    }
}
