//! CLI command implementations.

pub mod ingest;
pub mod label;
pub mod run;

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::domain::models::TaskSpec;

/// Read a JSON document from `path`.
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

pub(crate) async fn read_spec(path: &Path) -> Result<TaskSpec> {
    read_json(path).await.context("Invalid task spec")
}
