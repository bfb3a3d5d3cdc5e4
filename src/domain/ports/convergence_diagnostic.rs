use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Side-channel check for electronic non-convergence.
#[async_trait]
pub trait ConvergenceDiagnostic: Send + Sync {
    /// True when the run that wrote `output_artifact` failed to converge
    /// electronically.
    async fn is_unconverged(&self, output_artifact: &Path) -> DomainResult<bool>;
}
