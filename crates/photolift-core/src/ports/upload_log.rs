//! Uploaded-log port (driven/secondary port)
//!
//! The uploaded-log is the only durable state of a migration: a list of
//! absolute paths that have been fully uploaded and finalized. It is
//! append-only and entries are never removed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;

/// Durable record of successfully uploaded files
#[async_trait::async_trait]
pub trait IUploadLog: Send + Sync {
    /// Reads every recorded path
    ///
    /// A missing log is an empty set, not an error. Blank lines are ignored.
    async fn load(&self) -> Result<HashSet<PathBuf>>;

    /// Records one path and makes it durable before returning
    ///
    /// Each entry must land on its own line, even when a previous writer
    /// left the file without a trailing newline.
    async fn append(&self, path: &Path) -> Result<()>;

    /// Returns true if `path` has been recorded
    async fn contains(&self, path: &Path) -> Result<bool> {
        Ok(self.load().await?.contains(path))
    }
}
