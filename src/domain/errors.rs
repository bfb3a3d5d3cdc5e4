//! Domain errors for vaspflow tasks.
//!
//! Only infrastructure failures are errors. A failed simulation is a domain
//! outcome and is reported through an [`Action`](super::models::Action).

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a task invocation and surface to the runtime.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Source artifact not found: {}", .0.display())]
    MissingSourceArtifact(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Run location not found for handle: {0}")]
    LocationNotFound(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Assimilation failed: {0}")]
    Assimilation(String),

    #[error("Convergence diagnostic failed: {0}")]
    Diagnostic(String),

    #[error("External step '{step}' failed: {reason}")]
    ExternalStep { step: String, reason: String },

    #[error("Task spec is missing required field: {0}")]
    MissingSpecField(&'static str),

    #[error("Invalid run record: {0}")]
    InvalidRecord(String),

    #[error("Invalid composition: {0}")]
    InvalidComposition(String),

    #[error("Invalid task configuration: {0}")]
    InvalidTaskConfig(String),

    #[error("Invalid workflow graph: {0}")]
    InvalidGraph(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let err = DomainError::io(
            "/runs/block_1/INCAR",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/runs/block_1/INCAR"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let err: DomainError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, DomainError::Serialization(_)));
    }
}
