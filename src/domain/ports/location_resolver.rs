//! Location resolver port.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::RunHandle;

/// Maps a logical run handle to a directory that exists.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// Resolve `handle`, failing with `LocationNotFound` when no candidate exists.
    async fn resolve(&self, handle: &RunHandle) -> DomainResult<PathBuf>;
}
