//! Media classification
//!
//! Decides whether a local file can be uploaded to the photo library:
//! extension allow-list, MIME type derivation, and per-kind size limits.
//! Also holds the small value types exchanged with the library API
//! (upload tokens, new media items, and per-item finalize results).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::ValidationFailure;

/// Largest accepted image: 200 MiB (inclusive)
pub const IMAGE_SIZE_LIMIT: u64 = 200 * 1024 * 1024;

/// Largest accepted video: 20 GiB (inclusive)
pub const VIDEO_SIZE_LIMIT: u64 = 20 * 1024 * 1024 * 1024;

/// Image extensions accepted by the photo library (lowercase, no dot)
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "heic", "heif", "avif", "ico", "tiff", "raw",
];

/// Video extensions accepted by the photo library (lowercase, no dot)
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "3gp", "3g2", "asf", "avi", "divx", "m2t", "m2ts", "m4v", "mkv", "mmv", "mod", "mov", "mp4",
    "mpg", "mts", "tod", "wmv",
];

/// Extension to MIME type table used to derive a file's MIME type from its name
const MIME_TYPES: &[(&str, &str)] = &[
    // images
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("jpe", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("avif", "image/avif"),
    ("ico", "image/vnd.microsoft.icon"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("raw", "image/x-panasonic-raw"),
    ("svg", "image/svg+xml"),
    // videos
    ("3gp", "video/3gpp"),
    ("3g2", "video/3gpp2"),
    ("asf", "video/x-ms-asf"),
    ("avi", "video/x-msvideo"),
    ("divx", "video/divx"),
    ("m2t", "video/mp2t"),
    ("m2ts", "video/mp2t"),
    ("mts", "video/mp2t"),
    ("tod", "video/mp2t"),
    ("m4v", "video/x-m4v"),
    ("mkv", "video/x-matroska"),
    ("mmv", "video/x-mmv"),
    ("mod", "video/mpeg"),
    ("mpg", "video/mpeg"),
    ("mpeg", "video/mpeg"),
    ("mov", "video/quicktime"),
    ("mp4", "video/mp4"),
    ("wmv", "video/x-ms-wmv"),
    // everything else we can name but never upload
    ("txt", "text/plain"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/x-wav"),
];

/// Broad category of an uploadable media file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classifies a MIME type by its top-level type
    pub fn from_mime(mime: &str) -> Option<Self> {
        if mime.starts_with("image/") {
            Some(MediaKind::Image)
        } else if mime.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Inclusive size limit in bytes for this kind
    pub fn size_limit(&self) -> u64 {
        match self {
            MediaKind::Image => IMAGE_SIZE_LIMIT,
            MediaKind::Video => VIDEO_SIZE_LIMIT,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        };
        write!(f, "{}", s)
    }
}

/// Returns the lowercase extension of `path` without the leading dot
///
/// Returns an empty string for files without an extension. Dot-files such
/// as `.hidden` have no extension.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().trim().to_lowercase())
        .unwrap_or_default()
}

/// Returns true if `extension` (lowercase, no dot) is in the allow-list
pub fn is_supported_extension(extension: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&extension) || VIDEO_EXTENSIONS.contains(&extension)
}

/// Derives the MIME type of a file from its name
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let extension = extension_of(path);
    MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// Formats a byte count in MB below 1 GiB and GB above, two decimals
pub fn format_size(bytes: u64) -> String {
    const MIB: f64 = 1024.0 * 1024.0;
    let mb = bytes as f64 / MIB;
    if mb >= 1024.0 {
        format!("{:.2} GB", mb / 1024.0)
    } else {
        format!("{:.2} MB", mb)
    }
}

// ============================================================================
// MediaFile
// ============================================================================

/// A local file that passed classification and may be uploaded
///
/// Derived on demand from the filesystem and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaFile {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Exact size in bytes
    pub size: u64,
    /// Lowercase extension without the dot
    pub extension: String,
    /// Image or video
    pub kind: MediaKind,
    /// MIME type derived from the file name
    pub mime_type: String,
}

impl MediaFile {
    /// Validates a file by extension, MIME type and size
    ///
    /// Checks run in that order and the first failure is returned.
    /// The size limit is inclusive: a file exactly at the limit is accepted.
    pub fn classify(path: &Path, size: u64) -> Result<Self, ValidationFailure> {
        let extension = extension_of(path);
        if !is_supported_extension(&extension) {
            let shown = if extension.is_empty() {
                String::new()
            } else {
                format!(".{}", extension)
            };
            return Err(ValidationFailure::UnsupportedExtension(shown));
        }

        let mime_type = mime_type_for(path)
            .ok_or_else(|| ValidationFailure::UnsupportedMimeType("unknown".to_string()))?;
        let kind = MediaKind::from_mime(mime_type)
            .ok_or_else(|| ValidationFailure::UnsupportedMimeType(mime_type.to_string()))?;

        let limit = kind.size_limit();
        if size > limit {
            return Err(ValidationFailure::TooLarge { kind, size, limit });
        }

        Ok(Self {
            path: path.to_path_buf(),
            size,
            extension,
            kind,
            mime_type: mime_type.to_string(),
        })
    }

    /// Base name of the file, as sent to the library
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

// ============================================================================
// Library API value types
// ============================================================================

/// Opaque token returned by a raw upload, redeemable once by a finalize call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadToken(String);

impl UploadToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A media item to create from a previously uploaded token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMediaItem {
    /// File name shown in the library
    pub file_name: String,
    /// Token from the raw upload
    pub upload_token: UploadToken,
}

impl NewMediaItem {
    pub fn new(file_name: impl Into<String>, upload_token: UploadToken) -> Self {
        Self {
            file_name: file_name.into(),
            upload_token,
        }
    }
}

/// Status attached to a single finalize result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemStatus {
    /// Numeric status code; `Some(0)` is success
    pub code: Option<i32>,
    /// Status message; "Success" when the code is omitted
    pub message: Option<String>,
}

impl ItemStatus {
    /// Success is code 0, or no code with a message of "success" (any case)
    pub fn is_success(&self) -> bool {
        match self.code {
            Some(code) => code == 0,
            None => self
                .message
                .as_deref()
                .is_some_and(|m| m.eq_ignore_ascii_case("success")),
        }
    }
}

/// One entry of a finalize response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaItemResult {
    /// Status for this item
    pub status: ItemStatus,
    /// Identifier of the created library item, when successful
    pub media_item_id: Option<String>,
}
