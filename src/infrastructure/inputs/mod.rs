//! Writes rendered simulation inputs to disk.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::InputSet;
use crate::domain::ports::InputWriter;

/// Writes each input file verbatim into the target directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileInputWriter;

#[async_trait]
impl InputWriter for FileInputWriter {
    async fn write_inputs(&self, inputs: &InputSet, dir: &Path) -> DomainResult<Vec<String>> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| DomainError::io(dir, e))?;

        let mut written = Vec::new();
        for (name, contents) in inputs.files() {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(DomainError::InvalidTaskConfig(format!(
                    "input file name must be a bare file name: {name:?}"
                )));
            }
            let path = dir.join(name);
            tokio::fs::write(&path, contents)
                .await
                .map_err(|e| DomainError::io(&path, e))?;
            debug!(path = %path.display(), bytes = contents.len(), "wrote input");
            written.push(name.to_string());
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_every_input() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = InputSet::new()
            .with_file("INCAR", "ENCUT = 520\n")
            .with_file("KPOINTS", "Automatic\n0\nGamma\n4 4 4\n");

        let written = FileInputWriter
            .write_inputs(&inputs, dir.path())
            .await
            .unwrap();

        assert_eq!(written, vec!["INCAR", "KPOINTS"]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("INCAR")).unwrap(),
            "ENCUT = 520\n"
        );
    }

    #[tokio::test]
    async fn test_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = InputSet::new().with_file("../INCAR", "x");

        let err = FileInputWriter
            .write_inputs(&inputs, dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTaskConfig(_)));
    }
}
