use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::InputSet;

/// Writes rendered simulation inputs into a directory.
#[async_trait]
pub trait InputWriter: Send + Sync {
    /// Write every file of `inputs` into `dir`, returning the names written.
    async fn write_inputs(&self, inputs: &InputSet, dir: &Path) -> DomainResult<Vec<String>>;
}
