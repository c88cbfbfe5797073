//! Single-file upload use case
//!
//! Runs one file through the whole pipeline: credential refresh, existence
//! and classification checks, raw byte upload, finalize, and recording in
//! the uploaded-log. Every step short-circuits on failure and every failure
//! stays inside this file's outcome.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::domain::{MediaFile, NewMediaItem, UploadError, ValidationFailure};
use crate::ports::{
    ICredentialProvider, ILocalMedia, IMigrationReporter, IPhotosLibrary, IUploadLog,
    ProgressCallback,
};

/// Checks that a file exists and classifies it, without network activity
///
/// # Arguments
///
/// * `media` - Filesystem access used to stat the file
/// * `path` - Absolute path of the candidate file
///
/// # Returns
///
/// The classified file, or the first validation failure
pub async fn inspect_media(media: &dyn ILocalMedia, path: &Path) -> Result<MediaFile, UploadError> {
    let size = media
        .file_size(path)
        .await
        .with_context(|| format!("Failed to read metadata for {}", path.display()))?
        .ok_or_else(|| ValidationFailure::FileMissing(path.to_path_buf()))?;

    Ok(MediaFile::classify(path, size)?)
}

/// Use case for uploading one local file into the photo library
pub struct UploadMediaUseCase {
    credentials: Arc<dyn ICredentialProvider>,
    library: Arc<dyn IPhotosLibrary>,
    media: Arc<dyn ILocalMedia>,
    upload_log: Arc<dyn IUploadLog>,
    reporter: Arc<dyn IMigrationReporter>,
}

impl UploadMediaUseCase {
    /// Creates a new UploadMediaUseCase with the required dependencies
    ///
    /// # Arguments
    ///
    /// * `credentials` - Source of bearer tokens, refreshed on demand
    /// * `library` - Remote photo library
    /// * `media` - Local filesystem access
    /// * `upload_log` - Durable record of uploaded paths
    /// * `reporter` - Progress and outcome sink
    pub fn new(
        credentials: Arc<dyn ICredentialProvider>,
        library: Arc<dyn IPhotosLibrary>,
        media: Arc<dyn ILocalMedia>,
        upload_log: Arc<dyn IUploadLog>,
        reporter: Arc<dyn IMigrationReporter>,
    ) -> Self {
        Self {
            credentials,
            library,
            media,
            upload_log,
            reporter,
        }
    }

    /// Uploads a file and reports the outcome
    ///
    /// # Returns
    ///
    /// `true` if the file was uploaded and recorded, `false` if it was
    /// skipped or failed. Failed files are never recorded.
    pub async fn upload(&self, path: &Path) -> bool {
        let outcome = self.upload_file(path).await;
        self.reporter.file_finished(path, &outcome);
        outcome.is_ok()
    }

    /// Uploads a file and returns the detailed outcome
    ///
    /// Does not call [`IMigrationReporter::file_finished`]; callers that need
    /// the final report use [`UploadMediaUseCase::upload`] or report themselves.
    pub async fn upload_file(&self, path: &Path) -> Result<MediaFile, UploadError> {
        let access_token = self
            .credentials
            .access_token()
            .await
            .context("Failed to obtain access token")?;

        let file = inspect_media(self.media.as_ref(), path).await?;
        debug!(
            path = %path.display(),
            kind = %file.kind,
            mime = %file.mime_type,
            size = file.size,
            "File accepted"
        );

        self.reporter.upload_started(&file);
        let progress: ProgressCallback = {
            let reporter = Arc::clone(&self.reporter);
            let file = file.clone();
            Box::new(move |sent, total| reporter.upload_progress(&file, sent, total))
        };
        let upload_token = self
            .library
            .upload_bytes(&access_token, &file, Some(progress))
            .await?;
        self.reporter.upload_finished(&file);

        self.reporter.finalizing(&file);
        let item = NewMediaItem::new(file.file_name(), upload_token);
        let results = self.library.create_media_item(&access_token, &item).await?;

        let first = results
            .into_iter()
            .next()
            .ok_or_else(|| UploadError::Protocol("newMediaItemResults is empty".to_string()))?;

        if !first.status.is_success() {
            warn!(
                path = %path.display(),
                code = ?first.status.code,
                message = ?first.status.message,
                "Media item rejected"
            );
            return Err(UploadError::ItemRejected {
                code: first.status.code,
                message: first.status.message.unwrap_or_default(),
            });
        }

        self.upload_log
            .append(path)
            .await
            .with_context(|| format!("Uploaded but failed to record {}", path.display()))?;

        info!(
            path = %path.display(),
            media_item_id = ?first.media_item_id,
            "Uploaded"
        );
        Ok(file)
    }
}
