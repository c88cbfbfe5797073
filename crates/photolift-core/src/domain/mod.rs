//! Domain types and business rules
//!
//! This module contains the core domain types for PhotoLift:
//! - Media classification (extension allow-list, MIME types, size limits)
//! - Upload tokens and finalize results
//! - Per-run statistics and ETA estimation
//! - Domain-specific error types

pub mod errors;
pub mod media;
pub mod stats;

// Re-export commonly used types
pub use errors::{MigrationError, RateLimitStage, UploadError, ValidationFailure};
pub use media::{
    ItemStatus, MediaFile, MediaItemResult, MediaKind, NewMediaItem, UploadToken,
    IMAGE_SIZE_LIMIT, VIDEO_SIZE_LIMIT,
};
pub use stats::{estimate_remaining, format_eta, RunStats};
