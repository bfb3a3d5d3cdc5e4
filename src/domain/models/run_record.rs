//! Parsed result of one finished simulation run.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::spec::RunTags;
use crate::domain::errors::{DomainError, DomainResult};

/// Outcome state reported by assimilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Successful,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Successful => write!(f, "successful"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Identifier the results store assigned to an ingested run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(Value);

impl ExternalId {
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

/// Immutable record of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecord {
    state: RunState,
    analysis: Option<Value>,
    structure: Value,
    structure_group_id: Value,
    run_tags: RunTags,
}

impl RunRecord {
    /// Parse the document returned by assimilation.
    ///
    /// Any state other than `successful` is a failure. The `snl_final` and
    /// `snlgroup_id_final` fields win over `snl` and `snlgroup_id` when
    /// present. A successful document must carry an `analysis` payload.
    pub fn from_document(doc: &Value) -> DomainResult<Self> {
        let state = match doc.get("state").and_then(Value::as_str) {
            Some("successful") => RunState::Successful,
            Some(_) => RunState::Failed,
            None => {
                return Err(DomainError::InvalidRecord(
                    "document has no state".to_string(),
                ))
            }
        };

        let structure = preferred_field(doc, "snl")?;
        let structure_group_id = preferred_field(doc, "snlgroup_id")?;

        let analysis = match state {
            RunState::Successful => Some(doc.get("analysis").cloned().ok_or_else(|| {
                DomainError::InvalidRecord("successful document has no analysis".to_string())
            })?),
            RunState::Failed => None,
        };

        let run_tags = match doc.get("run_tags") {
            Some(tags) => serde_json::from_value(tags.clone())
                .map_err(|e| DomainError::InvalidRecord(format!("invalid run_tags: {e}")))?,
            None => RunTags::new(),
        };

        Ok(Self {
            state,
            analysis,
            structure,
            structure_group_id,
            run_tags,
        })
    }

    pub const fn state(&self) -> RunState {
        self.state
    }

    pub fn is_successful(&self) -> bool {
        self.state == RunState::Successful
    }

    /// Analysis payload; present only for successful runs.
    pub const fn analysis(&self) -> Option<&Value> {
        self.analysis.as_ref()
    }

    pub const fn structure(&self) -> &Value {
        &self.structure
    }

    pub const fn structure_group_id(&self) -> &Value {
        &self.structure_group_id
    }

    pub const fn run_tags(&self) -> &RunTags {
        &self.run_tags
    }
}

fn preferred_field(doc: &Value, key: &str) -> DomainResult<Value> {
    doc.get(format!("{key}_final").as_str())
        .or_else(|| doc.get(key))
        .cloned()
        .ok_or_else(|| DomainError::InvalidRecord(format!("document has no {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_successful_document() {
        let doc = json!({
            "state": "successful",
            "analysis": { "bandgap": 1.2 },
            "snl": { "sites": [] },
            "snlgroup_id": 17,
            "run_tags": ["mp_2013"]
        });
        let record = RunRecord::from_document(&doc).unwrap();
        assert!(record.is_successful());
        assert_eq!(record.analysis(), Some(&json!({ "bandgap": 1.2 })));
        assert_eq!(record.structure_group_id(), &json!(17));
        assert!(record.run_tags().contains("mp_2013"));
    }

    #[test]
    fn test_final_fields_take_precedence() {
        let doc = json!({
            "state": "failed",
            "snl": { "id": "original" },
            "snl_final": { "id": "corrected" },
            "snlgroup_id": 1,
            "snlgroup_id_final": 2
        });
        let record = RunRecord::from_document(&doc).unwrap();
        assert_eq!(record.state(), RunState::Failed);
        assert_eq!(record.structure(), &json!({ "id": "corrected" }));
        assert_eq!(record.structure_group_id(), &json!(2));
        assert!(record.analysis().is_none());
    }

    #[test]
    fn test_unknown_state_is_failure() {
        let doc = json!({ "state": "killed", "snl": {}, "snlgroup_id": 3 });
        assert_eq!(
            RunRecord::from_document(&doc).unwrap().state(),
            RunState::Failed
        );
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        assert!(RunRecord::from_document(&json!({ "snl": {}, "snlgroup_id": 1 })).is_err());
        assert!(RunRecord::from_document(&json!({ "state": "failed", "snlgroup_id": 1 })).is_err());
        assert!(RunRecord::from_document(&json!({
            "state": "successful", "snl": {}, "snlgroup_id": 1
        }))
        .is_err());
    }

    #[test]
    fn test_external_id_display() {
        assert_eq!(ExternalId::new(json!("mp-1234")).to_string(), "mp-1234");
        assert_eq!(ExternalId::new(json!(42)).to_string(), "42");
    }
}
