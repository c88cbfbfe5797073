//! Configuration module for PhotoLift.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// OAuth scope allowing uploads into the library without read access.
pub const APPEND_ONLY_SCOPE: &str = "https://www.googleapis.com/auth/photoslibrary.appendonly";

/// Redirect URI for the copy-paste ("out of band") installed-app flow.
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Raw byte upload endpoint.
pub const DEFAULT_UPLOAD_URL: &str = "https://photoslibrary.googleapis.com/v1/uploads";

/// Base URL of the Library API; `mediaItems:batchCreate` is resolved against it.
pub const DEFAULT_API_BASE_URL: &str = "https://photoslibrary.googleapis.com/v1";

/// Upper bound accepted for `upload.throttle_secs`.
const MAX_THROTTLE_SECS: u64 = 3600;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for PhotoLift.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub media: MediaConfig,
    pub auth: AuthConfig,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}

/// Local media settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Directory tree to migrate.
    pub root: PathBuf,
}

/// Authentication / OAuth settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Google client-secret JSON downloaded from the cloud console.
    /// The token cache is written next to it.
    pub secrets_path: PathBuf,
    /// Scopes requested during consent.
    pub scopes: Vec<String>,
    /// Redirect URI registered for the installed app.
    pub redirect_uri: String,
}

/// Library API and upload loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Raw byte upload endpoint.
    pub upload_url: String,
    /// Base URL for metadata calls.
    pub api_base_url: String,
    /// Seconds to sleep before each file.
    pub throttle_secs: u64,
    /// Append-only list of uploaded paths.
    pub log_path: PathBuf,
}

/// Logging / output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Keep every file's output on screen; `false` keeps only the current file's lines.
    pub show_all_output: bool,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/photolift/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("photolift")
            .join("config.yaml")
    }

    /// Media root with `~` expanded.
    pub fn media_root(&self) -> PathBuf {
        expand_home(&self.media.root)
    }

    /// Client-secret path with `~` expanded.
    pub fn secrets_path(&self) -> PathBuf {
        expand_home(&self.auth.secrets_path)
    }

    /// Uploaded-log path with `~` expanded.
    pub fn log_path(&self) -> PathBuf {
        expand_home(&self.upload.log_path)
    }

    /// Delay inserted before each file.
    pub fn throttle(&self) -> Duration {
        Duration::from_secs(self.upload.throttle_secs)
    }
}

/// Expands a leading `~` against the home directory.
///
/// Paths without the prefix, or when no home directory is known, are
/// returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("~/Pictures"),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("photolift");
        Self {
            secrets_path: config_dir.join("client_secrets.json"),
            scopes: vec![APPEND_ONLY_SCOPE.to_string()],
            redirect_uri: OOB_REDIRECT_URI.to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("photolift");
        Self {
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            throttle_secs: 2,
            log_path: data_dir.join("uploaded_files.txt"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_all_output: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"upload.upload_url"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid. Paths are not
    /// checked for existence here; missing files surface when they are used.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- media ---
        if self.media.root.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "media.root".into(),
                message: "must not be empty".into(),
            });
        }

        // --- auth ---
        if self.auth.secrets_path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "auth.secrets_path".into(),
                message: "must not be empty".into(),
            });
        }
        if self.auth.scopes.is_empty() {
            errors.push(ValidationError {
                field: "auth.scopes".into(),
                message: "at least one scope is required".into(),
            });
        }
        if self.auth.scopes.iter().any(|s| s.trim().is_empty()) {
            errors.push(ValidationError {
                field: "auth.scopes".into(),
                message: "scopes must not be blank".into(),
            });
        }
        if self.auth.redirect_uri.trim().is_empty() {
            errors.push(ValidationError {
                field: "auth.redirect_uri".into(),
                message: "must not be empty".into(),
            });
        }

        // --- upload ---
        for (field, value) in [
            ("upload.upload_url", &self.upload.upload_url),
            ("upload.api_base_url", &self.upload.api_base_url),
        ] {
            if let Err(e) = url::Url::parse(value) {
                errors.push(ValidationError {
                    field: field.into(),
                    message: format!("invalid URL '{}': {}", value, e),
                });
            }
        }
        if self.upload.throttle_secs > MAX_THROTTLE_SECS {
            errors.push(ValidationError {
                field: "upload.throttle_secs".into(),
                message: format!("must not exceed {}", MAX_THROTTLE_SECS),
            });
        }
        if self.upload.log_path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "upload.log_path".into(),
                message: "must not be empty".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use photolift_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .media_root(PathBuf::from("/mnt/photos"))
///     .upload_throttle_secs(5)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Start from an existing configuration, e.g. one loaded from disk.
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    // --- media ---

    pub fn media_root(mut self, root: PathBuf) -> Self {
        self.config.media.root = root;
        self
    }

    // --- auth ---

    pub fn auth_secrets_path(mut self, path: PathBuf) -> Self {
        self.config.auth.secrets_path = path;
        self
    }

    pub fn auth_scopes(mut self, scopes: Vec<String>) -> Self {
        self.config.auth.scopes = scopes;
        self
    }

    pub fn auth_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.config.auth.redirect_uri = uri.into();
        self
    }

    // --- upload ---

    pub fn upload_url(mut self, url: impl Into<String>) -> Self {
        self.config.upload.upload_url = url.into();
        self
    }

    pub fn upload_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.upload.api_base_url = url.into();
        self
    }

    pub fn upload_throttle_secs(mut self, seconds: u64) -> Self {
        self.config.upload.throttle_secs = seconds;
        self
    }

    pub fn upload_log_path(mut self, path: PathBuf) -> Self {
        self.config.upload.log_path = path;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_show_all_output(mut self, show: bool) -> Self {
        self.config.logging.show_all_output = show;
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
