//! PhotoLift Photos - Google Photos Library API client
//!
//! Provides async adapters for:
//! - OAuth2 installed-app authentication with a file-based token cache
//! - Raw byte uploads with streaming progress reporting
//! - Media item creation via `mediaItems:batchCreate`
//!
//! ## Modules
//!
//! - [`auth`] - Client secrets, token cache, and the credential provider
//! - [`client`] - Authenticated HTTP client and endpoint construction
//! - [`upload`] - Raw upload and finalize calls
//! - [`provider`] - `IPhotosLibrary` implementation tying the above together

pub mod auth;
pub mod client;
pub mod provider;
pub mod upload;
