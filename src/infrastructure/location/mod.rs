//! Filesystem location resolver.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::RunHandle;
use crate::domain::ports::LocationResolver;

/// Resolves run handles against the filesystem.
///
/// A handle that still exists is returned as is. Otherwise its `block_...`
/// tail is tried under each configured run location in order, which covers
/// run directories moved between scratch and archive storage.
#[derive(Debug, Clone, Default)]
pub struct FsLocationResolver {
    run_locations: Vec<PathBuf>,
}

impl FsLocationResolver {
    pub fn new(run_locations: Vec<PathBuf>) -> Self {
        Self { run_locations }
    }
}

#[async_trait]
impl LocationResolver for FsLocationResolver {
    #[instrument(skip(self), fields(handle = %handle))]
    async fn resolve(&self, handle: &RunHandle) -> DomainResult<PathBuf> {
        let direct = Path::new(handle.as_str());
        if is_dir(direct).await {
            return Ok(direct.to_path_buf());
        }

        if let Some(block) = handle.block_part() {
            for base in &self.run_locations {
                let candidate = base.join(block);
                if is_dir(&candidate).await {
                    debug!(resolved = %candidate.display(), "re-rooted moved run");
                    return Ok(candidate);
                }
            }
        }

        Err(DomainError::LocationNotFound(handle.to_string()))
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_existing_handle_resolves_to_itself() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = FsLocationResolver::default();

        let resolved = resolver
            .resolve(&RunHandle::from(dir.path()))
            .await
            .unwrap();
        assert_eq!(resolved, dir.path());
    }

    #[tokio::test]
    async fn test_moved_run_is_found_under_run_locations() {
        let archive = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let moved = archive.path().join("block_2014-01-02/launcher_3");
        std::fs::create_dir_all(&moved).unwrap();

        let resolver = FsLocationResolver::new(vec![
            scratch.path().to_path_buf(),
            archive.path().to_path_buf(),
        ]);
        let handle = RunHandle::new("/gone/scratch/block_2014-01-02/launcher_3");

        assert_eq!(resolver.resolve(&handle).await.unwrap(), moved);
    }

    #[tokio::test]
    async fn test_unresolvable_handle_is_an_error() {
        let base = tempfile::tempdir().unwrap();
        let resolver = FsLocationResolver::new(vec![base.path().to_path_buf()]);

        let err = resolver
            .resolve(&RunHandle::new("/gone/block_9/launcher_1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::LocationNotFound(_)));

        let err = resolver
            .resolve(&RunHandle::new("/gone/no_block_here"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::LocationNotFound(_)));
    }
}
