//! Migration reporter port (driven/secondary port)
//!
//! Receives progress and outcome events from the use cases so that the
//! presentation layer (progress bars, plain lines, JSON) stays out of the
//! core.
//!
//! ## Design Notes
//!
//! - Methods are synchronous and infallible: reporting must never affect
//!   whether a file is uploaded.
//! - `upload_progress` may be called many times per file and should be cheap.

use std::path::Path;
use std::time::Duration;

use crate::domain::{MediaFile, RunStats, UploadError};

/// Sink for migration progress events
pub trait IMigrationReporter: Send + Sync {
    /// No candidate files remain after excluding the uploaded-log
    fn nothing_to_upload(&self);

    /// The upload loop is about to start with `total` candidates
    fn run_started(&self, total: usize);

    /// Estimated time left, emitted before every file except the first
    fn eta(&self, remaining: Duration, files_left: usize);

    /// Processing of `path` begins
    ///
    /// `last_success` is the most recent file uploaded in this run, if any.
    fn file_started(&self, index: usize, total: usize, path: &Path, last_success: Option<&Path>);

    /// The raw byte upload for `file` begins
    fn upload_started(&self, file: &MediaFile);

    /// Cumulative bytes sent for the current file
    fn upload_progress(&self, file: &MediaFile, sent: u64, total: u64);

    /// The raw byte upload finished
    fn upload_finished(&self, file: &MediaFile);

    /// The finalize call for `file` begins
    fn finalizing(&self, file: &MediaFile);

    /// Final outcome for one file
    fn file_finished(&self, path: &Path, outcome: &Result<MediaFile, UploadError>);

    /// The run is complete
    fn run_finished(&self, stats: &RunStats);
}
