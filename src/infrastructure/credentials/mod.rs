//! Credentials management infrastructure
//!
//! Loads results-store connection parameters from a JSON file. The file's
//! directory comes from configuration or, when unset, from an environment
//! variable read at load time.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Credentials, CredentialsConfig};
use crate::domain::ports::CredentialsSource;

/// Reads [`Credentials`] from `<dir>/<file_name>`.
#[derive(Debug, Clone)]
pub struct FileCredentialsSource {
    dir: Option<PathBuf>,
    file_name: String,
    env_var: String,
}

impl FileCredentialsSource {
    pub fn new(config: &CredentialsConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            file_name: config.file_name.clone(),
            env_var: config.env_var.clone(),
        }
    }

    /// Path of the credentials file.
    pub fn file_path(&self) -> DomainResult<PathBuf> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => std::env::var_os(&self.env_var)
                .map(PathBuf::from)
                .ok_or_else(|| {
                    DomainError::Credentials(format!(
                        "no credentials directory configured and {} is not set",
                        self.env_var
                    ))
                })?,
        };
        Ok(dir.join(&self.file_name))
    }
}

#[async_trait]
impl CredentialsSource for FileCredentialsSource {
    async fn load(&self) -> DomainResult<Credentials> {
        let path = self.file_path()?;
        debug!(path = %path.display(), "loading results-store credentials");

        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| DomainError::io(&path, e))?;
        serde_json::from_str(&raw).map_err(|e| {
            DomainError::Credentials(format!("malformed {}: {e}", path.display()))
        })
    }
}
