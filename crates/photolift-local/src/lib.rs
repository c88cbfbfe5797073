//! PhotoLift Local - Filesystem adapters
//!
//! - [`LocalMediaAdapter`] implements `ILocalMedia`: walks the media tree and
//!   stats candidate files
//! - [`FileUploadLog`] implements `IUploadLog`: the append-only text file of
//!   uploaded paths

pub mod media;
pub mod upload_log;

pub use media::{enumerate_media, LocalMediaAdapter};
pub use upload_log::{parse_log, FileUploadLog};
