//! Ports for the two externally executed steps of a convergence retry.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::TaskSpec;

/// Rewrites the working directory's inputs in place before a retry.
#[async_trait]
pub trait ConvergenceHandlerSetup: Send + Sync {
    async fn apply(&self, working_dir: &Path) -> DomainResult<()>;
}

/// Runs the corrective simulation in the working directory.
#[async_trait]
pub trait CorrectiveRunner: Send + Sync {
    async fn run(&self, working_dir: &Path, spec: &TaskSpec) -> DomainResult<()>;
}
