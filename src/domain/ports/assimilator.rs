//! Assimilation port.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Credentials, ExternalId, IngestConfig};

/// Result of assimilating one run directory.
///
/// The document is already durably stored under `task_id` when this is
/// returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assimilation {
    pub task_id: ExternalId,
    pub document: Value,
}

/// Parses a finished run and writes it into the results store.
#[async_trait]
pub trait Assimilator: Send + Sync {
    async fn assimilate(
        &self,
        run_dir: &Path,
        credentials: &Credentials,
        options: &IngestConfig,
    ) -> DomainResult<Assimilation>;
}
