//! Credential ports (driven/secondary ports)
//!
//! The upload pipeline never sees OAuth machinery: it asks an
//! [`ICredentialProvider`] for a bearer token before every file, and the
//! provider refreshes behind the scenes when the token has expired.
//!
//! The interactive consent step is isolated behind [`ICodeExchanger`] so that
//! tests can supply a code without blocking on standard input.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tokens are treated as expired this long before their actual expiry
pub const EXPIRY_SKEW_SECONDS: i64 = 60;

// ============================================================================
// Tokens struct
// ============================================================================

/// OAuth tokens granted by the identity provider
///
/// The aliases accept the field names written by Google's own client
/// libraries (`token`, `expiry`), so existing token caches keep working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    /// Bearer token for authenticating API requests
    #[serde(alias = "token")]
    pub access_token: String,
    /// Token for obtaining new access tokens without user interaction
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// When the access token expires; `None` means unknown (never expires)
    #[serde(default, alias = "expiry")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Scopes the token was granted for
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl Tokens {
    /// Returns true if the access token has expired (with a small safety margin)
    pub fn is_expired(&self) -> bool {
        self.expires_within(Duration::seconds(EXPIRY_SKEW_SECONDS))
    }

    /// Returns true if the access token will expire within the given duration
    pub fn expires_within(&self, duration: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + duration >= expires_at,
            None => false,
        }
    }

    /// Returns true if a refresh token is available
    pub fn is_refreshable(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Returns true if every requested scope was granted
    pub fn covers_scopes(&self, requested: &[String]) -> bool {
        requested.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Returns true if the token can be used as-is for the requested scopes
    pub fn is_valid_for(&self, requested: &[String]) -> bool {
        !self.access_token.is_empty() && !self.is_expired() && self.covers_scopes(requested)
    }
}

// ============================================================================
// ICredentialProvider trait
// ============================================================================

/// Supplies bearer tokens for the photo library API
#[async_trait::async_trait]
pub trait ICredentialProvider: Send + Sync {
    /// Returns a usable access token
    ///
    /// Refreshes first if the current token is expired and a refresh token
    /// exists. An expired token without a refresh token is returned as-is;
    /// the API call that uses it will fail for that file only.
    async fn access_token(&self) -> anyhow::Result<String>;
}

// ============================================================================
// ICodeExchanger trait
// ============================================================================

/// Turns an authorization URL into an authorization code
///
/// The production implementation prints the URL and reads the code the
/// operator pastes back; it blocks until a line is entered.
#[async_trait::async_trait]
pub trait ICodeExchanger: Send + Sync {
    /// Presents `auth_url` to the operator and returns the code they obtained
    async fn request_code(&self, auth_url: &str) -> anyhow::Result<String>;
}
