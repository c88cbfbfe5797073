//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are the interfaces the use cases depend on; their implementations
//! live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IPhotosLibrary`] - Raw byte upload and media item creation
//! - [`ICredentialProvider`] - Bearer token supply with refresh-on-expiry
//! - [`ICodeExchanger`] - Interactive authorization code prompt
//! - [`IUploadLog`] - Durable record of already uploaded paths
//! - [`ILocalMedia`] - Directory enumeration and file metadata
//! - [`IMigrationReporter`] - Operator-facing progress and outcome reporting

pub mod credentials;
pub mod local_media;
pub mod photos_library;
pub mod reporter;
pub mod upload_log;

pub use credentials::{ICodeExchanger, ICredentialProvider, Tokens};
pub use local_media::ILocalMedia;
pub use photos_library::{IPhotosLibrary, ProgressCallback};
pub use reporter::IMigrationReporter;
pub use upload_log::IUploadLog;
