//! Locating the most recent version of a run artifact.
//!
//! A run that went through internal relaxation restarts leaves several
//! versions of each artifact behind. Lookup order for `dir/NAME`:
//! 1. `dir/relax2/NAME`
//! 2. `dir/NAME`
//! 3. `dir/NAME.relaxN` with the highest `N`
//! 4. `dir/relax1/NAME`
//!
//! When none exist the plain path is returned so the caller reports it.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Most recent existing version of `path`, or `path` itself.
pub async fn most_recent_version(path: &Path) -> PathBuf {
    let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
        return path.to_path_buf();
    };

    let second_relax = dir.join("relax2").join(name);
    if exists(&second_relax).await {
        return second_relax;
    }

    if exists(path).await {
        return path.to_path_buf();
    }

    if let Some(latest) = latest_suffixed(dir, &name.to_string_lossy()).await {
        debug!(path = %latest.display(), "using suffixed relaxation artifact");
        return latest;
    }

    let first_relax = dir.join("relax1").join(name);
    if exists(&first_relax).await {
        return first_relax;
    }

    path.to_path_buf()
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Highest-numbered `NAME.relaxN` in `dir`.
async fn latest_suffixed(dir: &Path, name: &str) -> Option<PathBuf> {
    let prefix = format!("{name}.relax");
    let mut entries = tokio::fs::read_dir(dir).await.ok()?;
    let mut best: Option<(u32, String, PathBuf)> = None;

    while let Ok(Some(entry)) = entries.next_entry().await {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let Some(rest) = file_name.strip_prefix(&prefix) else {
            continue;
        };
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        let Ok(index) = digits.parse::<u32>() else {
            continue;
        };

        let is_better = best.as_ref().is_none_or(|(best_index, best_name, _)| {
            (index, file_name.as_str()) > (*best_index, best_name.as_str())
        });
        if is_better {
            best = Some((index, file_name, entry.path()));
        }
    }

    best.map(|(_, _, path)| path)
}
