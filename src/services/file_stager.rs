//! File stager: copies artifacts of a previous run into the working directory.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Action, ArtifactSelection, CopyConfig, TaskSpec};
use crate::domain::ports::LocationResolver;
use crate::services::relaxation::most_recent_version;

/// Copies previous-run artifacts into a working directory.
pub struct FileStager {
    resolver: Arc<dyn LocationResolver>,
}

impl FileStager {
    pub fn new(resolver: Arc<dyn LocationResolver>) -> Self {
        Self { resolver }
    }

    /// Copy the configured artifacts of `spec.prev_run_dir` into `working_dir`.
    ///
    /// Each source is the most recent relaxation version of the artifact.
    /// A missing source aborts the copy. The copied names are returned as
    /// `copied_files` in the stored data.
    #[instrument(skip(self, config, spec), fields(prev_run_dir = tracing::field::Empty))]
    pub async fn stage(
        &self,
        config: &CopyConfig,
        spec: &TaskSpec,
        working_dir: &Path,
    ) -> DomainResult<Action> {
        let handle = spec
            .prev_run_dir
            .as_ref()
            .ok_or(DomainError::MissingSpecField("prev_run_dir"))?;
        tracing::Span::current().record("prev_run_dir", handle.as_str());

        let prev_dir = self.resolver.resolve(handle).await?;

        let files = match config.files() {
            ArtifactSelection::Named(names) => names.clone(),
            ArtifactSelection::All => list_files(&prev_dir).await?,
        };

        for file in &files {
            let source = most_recent_version(&prev_dir.join(file)).await;
            if !tokio::fs::try_exists(&source)
                .await
                .map_err(|e| DomainError::io(&source, e))?
            {
                return Err(DomainError::MissingSourceArtifact(source));
            }

            let destination = working_dir.join(config.destination_name(file));
            info!(
                source = %source.display(),
                destination = %destination.display(),
                "copying artifact"
            );
            tokio::fs::copy(&source, &destination)
                .await
                .map_err(|e| DomainError::io(&source, e))?;
        }

        Ok(Action::complete().stored("copied_files", Value::from(files)))
    }
}

/// Regular files directly inside `dir`, sorted by name.
async fn list_files(dir: &Path) -> DomainResult<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| DomainError::io(dir, e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DomainError::io(dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| DomainError::io(entry.path(), e))?;
        if file_type.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    names.sort();
    Ok(names)
}
