//! OAuth2 installed-app authentication for the Google Photos Library API
//!
//! Implements the Authorization Code flow with PKCE (RFC 7636) for a
//! desktop client registered in the Google Cloud console, with tokens
//! cached in a JSON file next to the client-secret file.
//!
//! ## Components
//!
//! - [`OAuth2Config`] - Scopes and redirect URI for the flow
//! - [`ClientSecrets`] - The `installed`/`web` client-secret JSON
//! - [`CachedToken`] - On-disk token cache
//! - [`InstalledAppFlow`] - PKCE challenge, code exchange and refresh
//! - [`OAuthCredentialProvider`] - `ICredentialProvider` backed by the cache
//! - [`StdinCodeExchanger`] - Prints the consent URL and reads the code

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use oauth2::{
    basic::BasicClient, AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, RefreshToken,
    Scope, TokenResponse, TokenUrl,
};
use photolift_core::config::{APPEND_ONLY_SCOPE, OOB_REDIRECT_URI};
use photolift_core::domain::MigrationError;
use photolift_core::ports::{ICodeExchanger, ICredentialProvider, Tokens};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Default Google OAuth2 authorization endpoint
pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

/// Default Google OAuth2 token endpoint
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Suffix appended to the secrets file stem to name the token cache
const CACHE_SUFFIX: &str = "-cached-token.json";

// ============================================================================
// OAuth2Config
// ============================================================================

/// Configuration for the installed-app flow
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    /// Redirect URI registered for the client
    pub redirect_uri: String,
    /// OAuth scopes to request
    pub scopes: Vec<String>,
}

impl OAuth2Config {
    /// Append-only library scope with the copy-paste redirect
    pub fn new() -> Self {
        Self {
            redirect_uri: OOB_REDIRECT_URI.to_string(),
            scopes: vec![APPEND_ONLY_SCOPE.to_string()],
        }
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = uri.into();
        self
    }
}

impl Default for OAuth2Config {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ClientSecrets
// ============================================================================

/// Client-secret file as downloaded from the Google Cloud console
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    installed: Option<ClientSecretEntry>,
    web: Option<ClientSecretEntry>,
}

/// Client identity and endpoints from a client-secret file
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecretEntry {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl ClientSecrets {
    /// Reads a client-secret file and returns its `installed` or `web` entry
    pub async fn load(path: &Path) -> Result<ClientSecretEntry> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read client secrets {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parses client-secret JSON, preferring the `installed` layout
    pub fn parse(json: &str) -> Result<ClientSecretEntry> {
        let secrets: ClientSecrets =
            serde_json::from_str(json).context("Failed to parse client secrets")?;
        match secrets.installed.or(secrets.web) {
            Some(entry) => Ok(entry),
            None => bail!("Client secrets contain neither an 'installed' nor a 'web' client"),
        }
    }
}

// ============================================================================
// Token cache
// ============================================================================

/// Path of the token cache for a given client-secret file
///
/// `dir/client_secrets.json` caches to `dir/client_secrets-cached-token.json`.
pub fn token_cache_path(secrets_path: &Path) -> PathBuf {
    let stem = secrets_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "client_secrets".to_string());
    let name = format!("{}{}", stem, CACHE_SUFFIX);
    match secrets_path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Token cache contents: the tokens plus what is needed to refresh them
/// without the client-secret file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
    #[serde(flatten)]
    pub tokens: Tokens,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl CachedToken {
    /// Reads the cache; a missing file is `Ok(None)`
    pub async fn load(path: &Path) -> Result<Option<Self>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read token cache {}", path.display()))
            }
        };
        let cached = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse token cache {}", path.display()))?;
        Ok(Some(cached))
    }

    /// Writes the cache, readable by the owner only on Unix
    pub async fn store(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize token cache")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write token cache {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .await
                .with_context(|| format!("Failed to restrict {}", path.display()))?;
        }

        debug!(path = %path.display(), "Stored token cache");
        Ok(())
    }
}

/// Summary of the cached credential, for `auth status`
#[derive(Debug, Clone, Serialize)]
pub struct TokenStatus {
    pub cache_path: PathBuf,
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
    pub refreshable: bool,
    pub scopes: Vec<String>,
}

/// Reports on the token cache belonging to `secrets_path`
///
/// # Returns
/// `None` if no cache exists
pub async fn token_status(secrets_path: &Path) -> Result<Option<TokenStatus>> {
    let cache_path = token_cache_path(secrets_path);
    let status = CachedToken::load(&cache_path).await?.map(|cached| TokenStatus {
        expires_at: cached.tokens.expires_at,
        expired: cached.tokens.is_expired(),
        refreshable: cached.tokens.is_refreshable(),
        scopes: cached.tokens.scopes,
        cache_path: cache_path.clone(),
    });
    Ok(status)
}

/// Deletes the token cache belonging to `secrets_path`
///
/// # Returns
/// `true` if a cache was removed, `false` if there was none
pub async fn logout(secrets_path: &Path) -> Result<bool> {
    let cache_path = token_cache_path(secrets_path);
    match tokio::fs::remove_file(&cache_path).await {
        Ok(()) => {
            info!(path = %cache_path.display(), "Removed token cache");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %cache_path.display(), "No token cache to remove");
            Ok(false)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", cache_path.display())),
    }
}

// ============================================================================
// InstalledAppFlow
// ============================================================================

/// OAuth2 installed-app flow implementation using the `oauth2` crate
///
/// Handles generating authorization URLs with PKCE challenges,
/// exchanging authorization codes for tokens, and refreshing tokens.
pub struct InstalledAppFlow {
    client: BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>,
    client_id: String,
    client_secret: Option<String>,
    token_uri: String,
    scopes: Vec<String>,
    http: reqwest::Client,
}

impl InstalledAppFlow {
    /// Creates a flow for the given client and configuration
    pub fn new(secrets: &ClientSecretEntry, config: &OAuth2Config) -> Result<Self> {
        let mut client = BasicClient::new(ClientId::new(secrets.client_id.clone()))
            .set_auth_uri(AuthUrl::new(secrets.auth_uri.clone()).context("Invalid authorization URL")?)
            .set_token_uri(TokenUrl::new(secrets.token_uri.clone()).context("Invalid token URL")?)
            .set_redirect_uri(
                RedirectUrl::new(config.redirect_uri.clone()).context("Invalid redirect URI")?,
            )
            .set_auth_type(AuthType::RequestBody);
        if let Some(secret) = &secrets.client_secret {
            client = client.set_client_secret(ClientSecret::new(secret.clone()));
        }

        // Token endpoints must not be followed through redirects
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to build OAuth HTTP client")?;

        Ok(Self {
            client,
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            token_uri: secrets.token_uri.clone(),
            scopes: config.scopes.clone(),
            http,
        })
    }

    /// Creates a flow that can only refresh, from a token cache
    pub fn from_cache(cached: &CachedToken, config: &OAuth2Config) -> Result<Self> {
        let secrets = ClientSecretEntry {
            client_id: cached.client_id.clone(),
            client_secret: cached.client_secret.clone(),
            auth_uri: GOOGLE_AUTH_URI.to_string(),
            token_uri: cached.token_uri.clone(),
        };
        Self::new(&secrets, config)
    }

    /// Generates an authorization URL with a PKCE challenge
    ///
    /// Requests offline access and forces the consent screen so that a
    /// refresh token is always issued.
    ///
    /// # Returns
    /// `(authorization_url, pkce_verifier)`; keep the verifier for the exchange
    pub fn generate_auth_url(&self) -> (String, PkceCodeVerifier) {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = self.client.authorize_url(CsrfToken::new_random);
        for scope in &self.scopes {
            auth_request = auth_request.add_scope(Scope::new(scope.clone()));
        }

        let (auth_url, _csrf_token) = auth_request
            .set_pkce_challenge(pkce_challenge)
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .url();

        debug!("Generated authorization URL");
        (auth_url.to_string(), pkce_verifier)
    }

    /// Exchanges an authorization code for tokens
    pub async fn exchange_code(&self, code: String, pkce_verifier: PkceCodeVerifier) -> Result<Tokens> {
        info!("Exchanging authorization code for tokens");

        let token_result = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&self.http)
            .await
            .context("Failed to exchange authorization code")?;

        let tokens = Tokens {
            access_token: token_result.access_token().secret().to_string(),
            refresh_token: token_result.refresh_token().map(|t| t.secret().to_string()),
            expires_at: Some(expiry_from(token_result.expires_in())),
            scopes: granted_scopes(token_result.scopes(), &self.scopes),
        };

        info!("Successfully obtained OAuth tokens");
        Ok(tokens)
    }

    /// Refreshes an access token
    ///
    /// The previous refresh token and scopes are kept when the response
    /// does not include new ones.
    pub async fn refresh(&self, previous: &Tokens) -> Result<Tokens> {
        let Some(refresh_token) = previous.refresh_token.as_deref() else {
            bail!("No refresh token available");
        };
        info!("Refreshing access token");

        let token_result = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&self.http)
            .await
            .context("Failed to refresh token")?;

        let tokens = Tokens {
            access_token: token_result.access_token().secret().to_string(),
            refresh_token: token_result
                .refresh_token()
                .map(|t| t.secret().to_string())
                .or_else(|| Some(refresh_token.to_string())),
            expires_at: Some(expiry_from(token_result.expires_in())),
            scopes: granted_scopes(token_result.scopes(), &previous.scopes),
        };

        info!("Successfully refreshed access token");
        Ok(tokens)
    }

    /// Wraps tokens with this flow's client identity for caching
    pub fn to_cache(&self, tokens: Tokens) -> CachedToken {
        CachedToken {
            tokens,
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            token_uri: self.token_uri.clone(),
        }
    }
}

fn expiry_from(expires_in: Option<std::time::Duration>) -> DateTime<Utc> {
    expires_in
        .map(|d| Utc::now() + Duration::seconds(d.as_secs() as i64))
        .unwrap_or_else(|| Utc::now() + Duration::hours(1))
}

fn granted_scopes(granted: Option<&Vec<Scope>>, fallback: &[String]) -> Vec<String> {
    match granted {
        Some(scopes) if !scopes.is_empty() => scopes.iter().map(|s| s.to_string()).collect(),
        _ => fallback.to_vec(),
    }
}

// ============================================================================
// OAuthCredentialProvider
// ============================================================================

/// Credential provider backed by the token cache
///
/// Holds the current tokens behind a `tokio::sync::Mutex`; every refresh
/// is written back to the cache file.
pub struct OAuthCredentialProvider {
    cache_path: PathBuf,
    flow: InstalledAppFlow,
    state: Mutex<CachedToken>,
}

impl std::fmt::Debug for OAuthCredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentialProvider")
            .field("cache_path", &self.cache_path)
            .finish_non_exhaustive()
    }
}

impl OAuthCredentialProvider {
    /// Loads cached credentials, refreshing or running the consent flow as needed
    ///
    /// 1. A cached token that is unexpired and covers the scopes is used as-is
    /// 2. An expired one with a refresh token is refreshed and re-cached
    /// 3. Otherwise the interactive flow runs through `exchanger`
    ///
    /// # Errors
    /// `Configuration` if the consent flow is needed and the client-secret
    /// file does not exist; `Unexpected` if a refresh or exchange fails
    pub async fn acquire(
        secrets_path: &Path,
        config: &OAuth2Config,
        exchanger: &dyn ICodeExchanger,
    ) -> Result<Self, MigrationError> {
        let cache_path = token_cache_path(secrets_path);

        let cached = match CachedToken::load(&cache_path).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Ignoring unreadable token cache");
                None
            }
        };

        if let Some(cached) = cached {
            if cached.tokens.is_valid_for(&config.scopes) {
                debug!(path = %cache_path.display(), "Using cached token");
                let flow = InstalledAppFlow::from_cache(&cached, config)?;
                return Ok(Self::from_parts(cache_path, flow, cached));
            }

            if cached.tokens.covers_scopes(&config.scopes) && cached.tokens.is_refreshable() {
                let flow = InstalledAppFlow::from_cache(&cached, config)?;
                let tokens = flow.refresh(&cached.tokens).await?;
                let refreshed = flow.to_cache(tokens);
                persist(&refreshed, &cache_path).await;
                return Ok(Self::from_parts(cache_path, flow, refreshed));
            }

            info!("Cached token does not cover the requested scopes or cannot be refreshed");
        }

        Self::login(secrets_path, config, exchanger).await
    }

    /// Runs the interactive consent flow unconditionally and caches the result
    pub async fn login(
        secrets_path: &Path,
        config: &OAuth2Config,
        exchanger: &dyn ICodeExchanger,
    ) -> Result<Self, MigrationError> {
        if !tokio::fs::try_exists(secrets_path).await.unwrap_or(false) {
            return Err(MigrationError::Configuration(format!(
                "Client secrets file not found: {}",
                secrets_path.display()
            )));
        }
        let secrets = ClientSecrets::load(secrets_path)
            .await
            .map_err(|e| MigrationError::Configuration(format!("{e:#}")))?;

        info!("Starting OAuth2 consent flow");
        let flow = InstalledAppFlow::new(&secrets, config)?;
        let (auth_url, pkce_verifier) = flow.generate_auth_url();

        let code = exchanger.request_code(&auth_url).await?;
        let code = code.trim().to_string();
        if code.is_empty() {
            return Err(MigrationError::Configuration(
                "No authorization code entered".to_string(),
            ));
        }

        let tokens = flow.exchange_code(code, pkce_verifier).await?;
        let cached = flow.to_cache(tokens);
        let cache_path = token_cache_path(secrets_path);
        persist(&cached, &cache_path).await;

        info!("OAuth2 consent flow completed successfully");
        Ok(Self::from_parts(cache_path, flow, cached))
    }

    fn from_parts(cache_path: PathBuf, flow: InstalledAppFlow, cached: CachedToken) -> Self {
        Self {
            cache_path,
            flow,
            state: Mutex::new(cached),
        }
    }

    /// Path of the token cache this provider writes to
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Snapshot of the current tokens
    pub async fn tokens(&self) -> Tokens {
        self.state.lock().await.tokens.clone()
    }
}

/// Writes the cache, logging instead of failing
async fn persist(cached: &CachedToken, path: &Path) {
    if let Err(e) = cached.store(path).await {
        warn!(error = %format!("{e:#}"), "Failed to persist token cache");
    }
}

#[async_trait::async_trait]
impl ICredentialProvider for OAuthCredentialProvider {
    async fn access_token(&self) -> Result<String> {
        let mut state = self.state.lock().await;
        if state.tokens.is_expired() && state.tokens.is_refreshable() {
            let tokens = self.flow.refresh(&state.tokens).await?;
            *state = self.flow.to_cache(tokens);
            persist(&state, &self.cache_path).await;
        }
        Ok(state.tokens.access_token.clone())
    }
}

// ============================================================================
// StdinCodeExchanger
// ============================================================================

/// Prints the authorization URL and reads the code from standard input
///
/// Output goes to stderr so that `--json` output on stdout stays clean.
#[derive(Debug, Clone, Default)]
pub struct StdinCodeExchanger {
    open_browser: bool,
}

impl StdinCodeExchanger {
    pub fn new(open_browser: bool) -> Self {
        Self { open_browser }
    }
}

#[async_trait::async_trait]
impl ICodeExchanger for StdinCodeExchanger {
    async fn request_code(&self, auth_url: &str) -> Result<String> {
        eprintln!("Please visit this URL to authorize this application:\n\n{}\n", auth_url);
        if self.open_browser {
            if let Err(e) = webbrowser::open(auth_url) {
                warn!(error = %e, "Failed to open browser");
            }
        }
        eprint!("Enter the authorization code: ");

        let line = tokio::task::spawn_blocking(|| {
            use std::io::Write;
            std::io::stderr().flush()?;
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            Ok::<_, std::io::Error>(line)
        })
        .await
        .context("Authorization prompt panicked")?
        .context("Failed to read authorization code")?;

        Ok(line.trim().to_string())
    }
}
