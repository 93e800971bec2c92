//! Locating and renaming the engine's output.
//!
//! The engine names its Markdown however it likes and does not report the
//! path. After each call the target directory is scanned and the most
//! recently modified `*.md` file is taken as the fresh artifact; it is then
//! moved to the canonical `<base_name>.md`, replacing any stale copy.

use crate::error::TaskError;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::debug;

/// Most recently modified regular file ending in `.md` directly inside `dir`.
///
/// Ties on modification time go to the lexicographically greatest name so
/// the choice is deterministic.
pub async fn latest_markdown(dir: &Path) -> Result<Option<PathBuf>, TaskError> {
    let scan_err = |e| TaskError::ScanArtifacts {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut entries = fs::read_dir(dir).await.map_err(scan_err)?;
    let mut best: Option<(SystemTime, PathBuf)> = None;

    while let Some(entry) = entries.next_entry().await.map_err(scan_err)? {
        let path = entry.path();
        if !path.to_string_lossy().ends_with(".md") {
            continue;
        }
        let meta = entry.metadata().await.map_err(scan_err)?;
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().map_err(scan_err)?;
        let newer = match &best {
            None => true,
            Some((t, p)) => (modified, &path) > (*t, p),
        };
        if newer {
            best = Some((modified, path));
        }
    }

    Ok(best.map(|(_, p)| p))
}

/// Move `artifact` to `canonical`, deleting a different file already there.
///
/// The artifact is first moved aside to a staging name so that a canonical
/// path which aliases it (names differing only in case on a case-insensitive
/// filesystem) is never deleted out from under it.
///
/// Returns `false` when the artifact already has the canonical name.
pub async fn normalize(artifact: &Path, canonical: &Path) -> Result<bool, TaskError> {
    if artifact == canonical {
        debug!("{} already canonical", canonical.display());
        return Ok(false);
    }

    let staged = staging_path(canonical);
    rename(artifact, &staged).await?;

    if fs::try_exists(canonical).await.unwrap_or(false) {
        fs::remove_file(canonical)
            .await
            .map_err(|e| TaskError::RemoveStale {
                path: canonical.to_path_buf(),
                source: e,
            })?;
        debug!("Removed stale {}", canonical.display());
    }

    rename(&staged, canonical).await?;
    debug!("Renamed {} → {}", artifact.display(), canonical.display());
    Ok(true)
}

/// `<canonical>.partial`; never ends in `.md`, so artifact scans skip it.
fn staging_path(canonical: &Path) -> PathBuf {
    let mut name = canonical.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

async fn rename(from: &Path, to: &Path) -> Result<(), TaskError> {
    fs::rename(from, to).await.map_err(|e| TaskError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source: e,
    })
}
