//! Google Photos Library API client
//!
//! Holds the shared `reqwest::Client` and the two endpoint roots the
//! migration talks to: the raw upload URL and the Library API base URL.
//! Access tokens are passed per request because the credential provider
//! may refresh them between files.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use photolift_photos::client::PhotosClient;
//! use reqwest::Method;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = PhotosClient::new();
//! let response = client
//!     .request(Method::GET, "/albums", "access-token-here")
//!     .send()
//!     .await?;
//! println!("{}", response.status());
//! # Ok(())
//! # }
//! ```

use photolift_core::config::{DEFAULT_API_BASE_URL, DEFAULT_UPLOAD_URL};
use reqwest::{Client, Method, RequestBuilder};

// ============================================================================
// PhotosClient
// ============================================================================

/// HTTP client for Google Photos Library API calls
#[derive(Debug, Clone)]
pub struct PhotosClient {
    /// The underlying HTTP client
    client: Client,
    /// Raw byte upload endpoint
    upload_url: String,
    /// Base URL for metadata requests, without a trailing slash
    api_base_url: String,
}

impl PhotosClient {
    /// Creates a client for the production endpoints
    pub fn new() -> Self {
        Self::with_endpoints(DEFAULT_UPLOAD_URL, DEFAULT_API_BASE_URL)
    }

    /// Creates a client with custom endpoints (useful for testing)
    ///
    /// # Arguments
    /// * `upload_url` - Full URL of the raw upload endpoint
    /// * `api_base_url` - Base URL that API paths are appended to
    pub fn with_endpoints(upload_url: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        let api_base_url: String = api_base_url.into();
        Self {
            client: Client::new(),
            upload_url: upload_url.into(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the raw upload endpoint
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// Returns the API base URL
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Creates an authenticated request builder for an API path
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to the base URL (e.g. "/mediaItems:batchCreate")
    /// * `access_token` - Bearer token for this request
    pub fn request(&self, method: Method, path: &str, access_token: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_base_url, path);
        self.client.request(method, &url).bearer_auth(access_token)
    }

    /// Creates an authenticated POST to the raw upload endpoint
    pub fn upload_request(&self, access_token: &str) -> RequestBuilder {
        self.client
            .post(&self.upload_url)
            .bearer_auth(access_token)
    }
}

impl Default for PhotosClient {
    fn default() -> Self {
        Self::new()
    }
}
