//! Upload operations for the Google Photos Library API
//!
//! Adding a file to the library takes two requests:
//! - [`upload_raw`] - Streams the file bytes and receives an upload token
//! - [`batch_create`] - Redeems the upload token for a media item
//!
//! Both map HTTP 429 to [`UploadError::RateLimited`] and leave retrying to
//! the next run.
//!
//! ## API References
//!
//! - [Upload media](https://developers.google.com/photos/library/guides/upload-media)

use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use anyhow::Context;
use photolift_core::domain::{
    ItemStatus, MediaFile, MediaItemResult, NewMediaItem, RateLimitStage, UploadError,
    UploadToken,
};
use photolift_core::ports::ProgressCallback;
use reqwest::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Method, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::io::ReaderStream;
use tracing::{debug, instrument};

use crate::client::PhotosClient;

/// Read size for the streaming request body
const STREAM_CHUNK_SIZE: usize = 256 * 1024;

// ============================================================================
// ProgressReader
// ============================================================================

/// `AsyncRead` wrapper that counts bytes and reports progress
///
/// The callback receives `(bytes_read, total)` after every read that
/// returned data. `total` is the expected length supplied at construction.
pub struct ProgressReader<R> {
    inner: R,
    total: u64,
    bytes_read: u64,
    callback: Option<ProgressCallback>,
}

impl<R> ProgressReader<R> {
    pub fn new(inner: R, total: u64, callback: Option<ProgressCallback>) -> Self {
        Self {
            inner,
            total,
            bytes_read: 0,
            callback,
        }
    }

    /// Expected total length in bytes
    pub fn len(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Bytes read so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();

        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = poll {
            let read = (buf.filled().len() - before) as u64;
            if read > 0 {
                this.bytes_read += read;
                if let Some(callback) = &this.callback {
                    callback(this.bytes_read, this.total);
                }
            }
        }
        poll
    }
}

// ============================================================================
// upload_raw
// ============================================================================

/// Streams a file to the raw upload endpoint
///
/// Sends `POST {upload_url}` with the file as an unbuffered body and the
/// `X-Goog-Upload-Protocol: raw` headers.
///
/// # Arguments
/// * `client` - The PhotosClient
/// * `access_token` - Bearer token
/// * `file` - The classified file to send
/// * `progress` - Optional callback `(bytes_sent, total_bytes)`
///
/// # Returns
/// The upload token from the response body
///
/// # Errors
/// - `RateLimited` on HTTP 429
/// - `Transport` on any other non-200 status, carrying the response body
/// - `MissingUploadToken` if the body is empty or whitespace
#[instrument(skip(client, access_token, file, progress), fields(path = %file.path.display(), size = file.size))]
pub async fn upload_raw(
    client: &PhotosClient,
    access_token: &str,
    file: &MediaFile,
    progress: Option<ProgressCallback>,
) -> Result<UploadToken, UploadError> {
    let handle = tokio::fs::File::open(&file.path)
        .await
        .with_context(|| format!("Failed to open {}", file.path.display()))?;
    let reader = ProgressReader::new(handle, file.size, progress);
    let body = Body::wrap_stream(ReaderStream::with_capacity(reader, STREAM_CHUNK_SIZE));

    let file_name = HeaderValue::from_bytes(file.file_name().as_bytes())
        .context("File name cannot be sent as a header")?;

    debug!("Starting raw upload");
    let response = client
        .upload_request(access_token)
        .header(CONTENT_TYPE, "application/octet-stream")
        .header(CONTENT_LENGTH, file.size)
        .header("X-Goog-Upload-File-Name", file_name)
        .header("X-Goog-Upload-Protocol", "raw")
        .body(body)
        .send()
        .await
        .context("Failed to send upload request")?;

    let status = response.status();
    let text = response
        .text()
        .await
        .context("Failed to read upload response")?;

    match status {
        StatusCode::TOO_MANY_REQUESTS => Err(UploadError::RateLimited {
            stage: RateLimitStage::Upload,
        }),
        StatusCode::OK if text.trim().is_empty() => Err(UploadError::MissingUploadToken),
        StatusCode::OK => {
            debug!("Raw upload complete");
            Ok(UploadToken::new(text))
        }
        _ => Err(UploadError::Transport {
            status: status.as_u16(),
            body: text,
        }),
    }
}

// ============================================================================
// batch_create
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchCreateRequest<'a> {
    new_media_items: Vec<NewMediaItemBody<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewMediaItemBody<'a> {
    simple_media_item: SimpleMediaItem<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimpleMediaItem<'a> {
    file_name: &'a str,
    upload_token: &'a str,
}

/// Response of `mediaItems:batchCreate`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchCreateResponse {
    #[serde(default)]
    new_media_item_results: Vec<NewMediaItemResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewMediaItemResult {
    status: Option<StatusBody>,
    media_item: Option<MediaItemBody>,
}

/// `google.rpc.Status`; `code` is omitted when it is 0
#[derive(Debug, Deserialize)]
struct StatusBody {
    code: Option<i32>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaItemBody {
    id: Option<String>,
}

impl From<NewMediaItemResult> for MediaItemResult {
    fn from(result: NewMediaItemResult) -> Self {
        let status = result
            .status
            .map(|s| ItemStatus {
                code: s.code,
                message: s.message,
            })
            .unwrap_or_default();
        Self {
            status,
            media_item_id: result.media_item.and_then(|m| m.id),
        }
    }
}

/// Creates a media item from an upload token
///
/// Uses `POST {api_base}/mediaItems:batchCreate` with a single new item.
///
/// # Returns
/// Every entry of `newMediaItemResults`, in response order
///
/// # Errors
/// - `RateLimited` on HTTP 429
/// - `Transport` on any other non-success status
/// - `Protocol` if the body is not a batchCreate response
#[instrument(skip(client, access_token, item), fields(file_name = %item.file_name))]
pub async fn batch_create(
    client: &PhotosClient,
    access_token: &str,
    item: &NewMediaItem,
) -> Result<Vec<MediaItemResult>, UploadError> {
    let request = BatchCreateRequest {
        new_media_items: vec![NewMediaItemBody {
            simple_media_item: SimpleMediaItem {
                file_name: &item.file_name,
                upload_token: item.upload_token.as_str(),
            },
        }],
    };

    let response = client
        .request(Method::POST, "/mediaItems:batchCreate", access_token)
        .json(&request)
        .send()
        .await
        .context("Failed to send batchCreate request")?;

    let status = response.status();
    let text = response
        .text()
        .await
        .context("Failed to read batchCreate response")?;

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(UploadError::RateLimited {
            stage: RateLimitStage::BatchCreate,
        });
    }
    if !status.is_success() {
        return Err(UploadError::Transport {
            status: status.as_u16(),
            body: text,
        });
    }

    let parsed: BatchCreateResponse = serde_json::from_str(&text)
        .map_err(|e| UploadError::Protocol(format!("batchCreate response: {}", e)))?;
    debug!(results = parsed.new_media_item_results.len(), "batchCreate complete");

    Ok(parsed
        .new_media_item_results
        .into_iter()
        .map(MediaItemResult::from)
        .collect())
}
