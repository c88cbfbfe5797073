//! PhotosLibraryProvider - IPhotosLibrary implementation for Google Photos
//!
//! Wraps the [`PhotosClient`] and delegates to the upload module to fulfil
//! the [`IPhotosLibrary`] port contract.
//!
//! ## Design Notes
//!
//! - Holds no credentials. The use case fetches a bearer token from its
//!   `ICredentialProvider` before each file and passes it through.
//! - No retries: a 429 at either stage is returned to the caller as-is.

use photolift_core::domain::{MediaFile, MediaItemResult, NewMediaItem, UploadError, UploadToken};
use photolift_core::ports::{IPhotosLibrary, ProgressCallback};

use crate::client::PhotosClient;
use crate::upload;

/// Google Photos Library API implementation of [`IPhotosLibrary`]
#[derive(Debug, Clone, Default)]
pub struct PhotosLibraryProvider {
    client: PhotosClient,
}

impl PhotosLibraryProvider {
    pub fn new(client: PhotosClient) -> Self {
        Self { client }
    }

    /// Returns the underlying client
    pub fn client(&self) -> &PhotosClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl IPhotosLibrary for PhotosLibraryProvider {
    async fn upload_bytes(
        &self,
        access_token: &str,
        file: &MediaFile,
        progress: Option<ProgressCallback>,
    ) -> Result<UploadToken, UploadError> {
        upload::upload_raw(&self.client, access_token, file, progress).await
    }

    async fn create_media_item(
        &self,
        access_token: &str,
        item: &NewMediaItem,
    ) -> Result<Vec<MediaItemResult>, UploadError> {
        upload::batch_create(&self.client, access_token, item).await
    }
}
