//! Photo library port (driven/secondary port)
//!
//! The library accepts media in two steps: raw bytes are uploaded first and
//! exchanged for an opaque [`UploadToken`], which is then redeemed by a
//! finalize call that creates the visible media item.
//!
//! ## Design Notes
//!
//! - Uses [`UploadError`] rather than `anyhow::Result` because the pipeline
//!   must tell rate limiting apart from other HTTP failures.
//! - The bearer token is passed per call; the adapter never refreshes it.

use crate::domain::{MediaFile, MediaItemResult, NewMediaItem, UploadError, UploadToken};

/// Callback invoked as bytes are sent: `(bytes_sent, total_bytes)`
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Remote photo library operations
#[async_trait::async_trait]
pub trait IPhotosLibrary: Send + Sync {
    /// Streams the file's bytes to the upload endpoint
    ///
    /// # Arguments
    ///
    /// * `access_token` - Bearer token for this request
    /// * `file` - The classified file to send
    /// * `progress` - Optional callback receiving cumulative bytes sent
    ///
    /// # Returns
    ///
    /// The upload token identifying the uploaded bytes
    async fn upload_bytes(
        &self,
        access_token: &str,
        file: &MediaFile,
        progress: Option<ProgressCallback>,
    ) -> Result<UploadToken, UploadError>;

    /// Creates a media item from a previously returned upload token
    ///
    /// Returns every result entry in the response; the caller inspects the first.
    async fn create_media_item(
        &self,
        access_token: &str,
        item: &NewMediaItem,
    ) -> Result<Vec<MediaItemResult>, UploadError>;
}
