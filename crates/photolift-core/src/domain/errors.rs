//! Domain error types
//!
//! Errors are split by blast radius:
//! - [`MigrationError`] aborts the whole run (initialization failures)
//! - [`UploadError`] is contained at the file boundary; the run continues
//! - [`ValidationFailure`] is the subset of [`UploadError`] raised before any
//!   network activity

use std::path::PathBuf;

use thiserror::Error;

use super::media::{format_size, MediaKind};

/// Errors that are fatal for a whole migration run
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Credentials could not be obtained (e.g. no client secrets and no cached token)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The media root directory does not exist
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Any other initialization failure
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Reasons a file is rejected before upload
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// The file disappeared between enumeration and upload
    #[error("File not found: {}", .0.display())]
    FileMissing(PathBuf),

    /// The extension is not in the allow-list
    #[error("Unsupported file extension: {0:?}")]
    UnsupportedExtension(String),

    /// The MIME type could not be derived or is not image/video
    #[error("Unsupported MIME type: {0}")]
    UnsupportedMimeType(String),

    /// The file exceeds the size limit for its media kind
    #[error("{kind} exceeds {} limit ({})", format_size(*.limit), format_size(*.size))]
    TooLarge {
        /// Media kind the limit applies to
        kind: MediaKind,
        /// Actual size in bytes
        size: u64,
        /// Inclusive limit in bytes
        limit: u64,
    },
}

/// Which call signalled rate limiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitStage {
    /// The raw byte upload
    Upload,
    /// The `mediaItems:batchCreate` finalize call
    BatchCreate,
}

impl std::fmt::Display for RateLimitStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RateLimitStage::Upload => "upload",
            RateLimitStage::BatchCreate => "batchCreate",
        };
        write!(f, "{}", s)
    }
}

/// Per-file upload failure
///
/// None of these variants abort the run and none of them record the file
/// in the uploaded-log, so every failed file stays a candidate for the next
/// invocation.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Rejected by extension, MIME type, size, or existence checks
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// HTTP 429 from either the raw upload or the finalize call
    #[error("Too many requests ({stage} quota exceeded)")]
    RateLimited {
        /// The call that was throttled
        stage: RateLimitStage,
    },

    /// A non-success HTTP status other than 429
    #[error("Upload failed with status {status}: {body}")]
    Transport {
        /// HTTP status code
        status: u16,
        /// Response body as returned by the server
        body: String,
    },

    /// The raw upload succeeded but returned no upload token
    #[error("Upload token not received")]
    MissingUploadToken,

    /// The finalize response could not be interpreted
    #[error("Invalid response: {0}")]
    Protocol(String),

    /// The finalize call returned a non-success item status
    #[error("Failed to create media item [Code: {}] {message}", code_label(.code))]
    ItemRejected {
        /// Numeric status code, if present
        code: Option<i32>,
        /// Status message, possibly empty
        message: String,
    },

    /// Anything else that went wrong while handling this file
    #[error("Unexpected error: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl UploadError {
    /// Returns true for failures that never reached the network
    pub fn is_validation(&self) -> bool {
        matches!(self, UploadError::Validation(_))
    }

    /// Returns true for HTTP 429 soft failures
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, UploadError::RateLimited { .. })
    }
}

fn code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "None".to_string(),
    }
}
