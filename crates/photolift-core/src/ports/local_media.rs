//! Local media port (driven/secondary port)
//!
//! Abstracts the filesystem reads the migration needs: checking the media
//! root, statting candidate files and walking the tree.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;

/// Read-only access to the local media tree
#[async_trait::async_trait]
pub trait ILocalMedia: Send + Sync {
    /// Returns true if `path` exists and is a directory
    async fn is_directory(&self, path: &Path) -> Result<bool>;

    /// Returns the size of a regular file, or `None` if it does not exist
    async fn file_size(&self, path: &Path) -> Result<Option<u64>>;

    /// Lists every regular file under `root`, recursively
    ///
    /// Paths are absolute, exclude any member of `exclude`, and are sorted
    /// so that repeated runs over the same tree visit files in the same order.
    async fn enumerate(&self, root: &Path, exclude: &HashSet<PathBuf>) -> Result<Vec<PathBuf>>;
}
