//! Migration run use case
//!
//! Drives one migration run over a media root: checks the root, excludes
//! already uploaded files, then feeds the remaining files one at a time to
//! the [`UploadMediaUseCase`] with a fixed delay between them.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::domain::{estimate_remaining, MigrationError, RunStats};
use crate::ports::{ILocalMedia, IMigrationReporter, IUploadLog};
use crate::usecases::upload_media::UploadMediaUseCase;

/// Use case for migrating a whole directory tree
pub struct MigrateUseCase {
    pipeline: Arc<UploadMediaUseCase>,
    media: Arc<dyn ILocalMedia>,
    upload_log: Arc<dyn IUploadLog>,
    reporter: Arc<dyn IMigrationReporter>,
    throttle: Duration,
}

impl MigrateUseCase {
    /// Creates a new MigrateUseCase
    ///
    /// # Arguments
    ///
    /// * `pipeline` - Per-file upload pipeline
    /// * `media` - Local filesystem access for the root check and enumeration
    /// * `upload_log` - Uploaded-log, read once at the start of the run
    /// * `reporter` - Progress and outcome sink
    /// * `throttle` - Delay before each file
    pub fn new(
        pipeline: Arc<UploadMediaUseCase>,
        media: Arc<dyn ILocalMedia>,
        upload_log: Arc<dyn IUploadLog>,
        reporter: Arc<dyn IMigrationReporter>,
        throttle: Duration,
    ) -> Self {
        Self {
            pipeline,
            media,
            upload_log,
            reporter,
            throttle,
        }
    }

    /// Lists the files a run over `root` would attempt, in upload order
    ///
    /// # Errors
    ///
    /// Returns `DirectoryNotFound` if `root` is missing or not a directory,
    /// and `Unexpected` if the uploaded-log or the tree cannot be read
    pub async fn pending_files(&self, root: &Path) -> Result<Vec<PathBuf>, MigrationError> {
        pending_files(self.media.as_ref(), self.upload_log.as_ref(), root).await
    }

    /// Uploads every pending file under `root`
    ///
    /// Per-file failures are counted, never propagated.
    ///
    /// # Returns
    ///
    /// Statistics for the run; all zero when nothing was pending
    pub async fn run(&self, root: &Path) -> Result<RunStats, MigrationError> {
        let files = self.pending_files(root).await?;
        let mut stats = RunStats::default();

        if files.is_empty() {
            info!(root = %root.display(), "No files to upload");
            self.reporter.nothing_to_upload();
            return Ok(stats);
        }

        let total = files.len();
        info!(root = %root.display(), total, "Starting migration");
        self.reporter.run_started(total);

        let started = Instant::now();
        let mut last_success: Option<PathBuf> = None;

        for (index, path) in files.iter().enumerate() {
            if !self.throttle.is_zero() {
                tokio::time::sleep(self.throttle).await;
            }

            if let Some(remaining) = estimate_remaining(started.elapsed(), index, total) {
                self.reporter.eta(remaining, total - index);
            }

            self.reporter
                .file_started(index, total, path, last_success.as_deref());
            debug!(index, total, path = %path.display(), "Processing file");

            let outcome = self.pipeline.upload_file(path).await;
            self.reporter.file_finished(path, &outcome);
            stats.record(&outcome);
            if outcome.is_ok() {
                last_success = Some(path.clone());
            }
        }

        stats.elapsed = started.elapsed();
        info!(
            attempted = stats.attempted,
            succeeded = stats.succeeded,
            skipped = stats.skipped,
            rate_limited = stats.rate_limited,
            failed = stats.failed,
            "Migration finished"
        );
        self.reporter.run_finished(&stats);
        Ok(stats)
    }
}

/// Checks `root`, loads the uploaded-log and enumerates what is left
///
/// Shared by the migration run and the `scan` dry run.
pub async fn pending_files(
    media: &dyn ILocalMedia,
    upload_log: &dyn IUploadLog,
    root: &Path,
) -> Result<Vec<PathBuf>, MigrationError> {
    let is_dir = media
        .is_directory(root)
        .await
        .with_context(|| format!("Failed to inspect {}", root.display()))?;
    if !is_dir {
        return Err(MigrationError::DirectoryNotFound(root.to_path_buf()));
    }

    let uploaded = upload_log
        .load()
        .await
        .context("Failed to load uploaded-log")?;
    debug!(entries = uploaded.len(), "Loaded uploaded-log");

    let files = media
        .enumerate(root, &uploaded)
        .await
        .with_context(|| format!("Failed to enumerate {}", root.display()))?;
    Ok(files)
}
