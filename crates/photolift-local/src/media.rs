//! Local media adapter (secondary/driven adapter)
//!
//! Implements [`ILocalMedia`] on top of `walkdir` and `tokio::fs`.
//!
//! ## Design Decisions
//!
//! - **Blocking walk**: the directory walk is synchronous and runs on the
//!   blocking pool via `spawn_blocking`.
//! - **Symlinks**: symlinked files are listed, symlinked directories are not
//!   descended.
//! - **Ordering**: results are sorted by the raw bytes of the full path, so the
//!   order only depends on the tree contents.
//! - **Absolute paths**: the root is made absolute without resolving
//!   symlinks, so paths match what earlier runs recorded in the uploaded-log.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use photolift_core::ports::ILocalMedia;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

// ============================================================================
// LocalMediaAdapter struct
// ============================================================================

/// Adapter that bridges the [`ILocalMedia`] port to the real filesystem.
///
/// Zero-sized: every operation takes the paths it works on as arguments.
#[derive(Debug, Clone, Default)]
pub struct LocalMediaAdapter;

impl LocalMediaAdapter {
    /// Create a new `LocalMediaAdapter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Lists every regular file under `root` that is not in `exclude`
///
/// Blocking. Entries that cannot be read are logged and skipped; only a
/// failure to make `root` absolute is an error.
///
/// # Returns
///
/// Absolute paths sorted by their byte representation
pub fn enumerate_media(root: &Path, exclude: &HashSet<PathBuf>) -> std::io::Result<Vec<PathBuf>> {
    let root = std::path::absolute(root)?;

    let mut files: Vec<PathBuf> = WalkDir::new(&root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(
                    path = ?e.path(),
                    error = %e,
                    "Skipping unreadable entry"
                );
                None
            }
        })
        .map(walkdir::DirEntry::into_path)
        .filter(|path| path.is_file())
        .filter(|path| !exclude.contains(path))
        .collect();

    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    Ok(files)
}

// ============================================================================
// ILocalMedia implementation
// ============================================================================

#[async_trait::async_trait]
impl ILocalMedia for LocalMediaAdapter {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn is_directory(&self, path: &Path) -> anyhow::Result<bool> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to stat {}", path.display())),
        }
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn file_size(&self, path: &Path) -> anyhow::Result<Option<u64>> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(metadata.len())),
            Ok(_) => {
                debug!("not a regular file");
                Ok(None)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("path not found");
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to stat {}", path.display())),
        }
    }

    #[instrument(skip(self, exclude), fields(root = %root.display(), excluded = exclude.len()))]
    async fn enumerate(&self, root: &Path, exclude: &HashSet<PathBuf>) -> anyhow::Result<Vec<PathBuf>> {
        let root = root.to_path_buf();
        let exclude = exclude.clone();
        let files = tokio::task::spawn_blocking(move || enumerate_media(&root, &exclude))
            .await
            .context("Directory walk panicked")?
            .context("Failed to resolve media root")?;
        debug!(count = files.len(), "enumeration complete");
        Ok(files)
    }
}

// ============================================================================
// Unit tests
// ============================================================================
