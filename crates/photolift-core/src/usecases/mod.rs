//! Use cases (application layer)
//!
//! - [`UploadMediaUseCase`] - Uploads a single file: validate, upload bytes, finalize, record
//! - [`MigrateUseCase`] - Runs the per-file pipeline over a whole directory tree

pub mod migrate;
pub mod upload_media;

pub use migrate::{pending_files, MigrateUseCase};
pub use upload_media::{inspect_media, UploadMediaUseCase};
