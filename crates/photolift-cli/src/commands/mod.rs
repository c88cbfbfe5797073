//! CLI subcommands
//!
//! Every command receives a [`CommandContext`] carrying the global flags.
//! Flag overrides on top of the config file are applied here so that
//! `migrate` and `scan` resolve paths the same way.

pub mod auth;
pub mod config;
pub mod migrate;
pub mod scan;

use std::path::PathBuf;

use anyhow::{Context, Result};
use photolift_core::config::{Config, ConfigBuilder};

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

/// Global options shared by all commands
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub format: OutputFormat,
    pub quiet: bool,
    config_path: Option<PathBuf>,
}

impl CommandContext {
    pub fn new(format: OutputFormat, quiet: bool, config_path: Option<PathBuf>) -> Self {
        Self {
            format,
            quiet,
            config_path,
        }
    }

    /// The `--config` path, or the platform default
    pub fn config_path(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(Config::default_path)
    }

    /// Returns true if `--config` was given
    pub fn has_explicit_config(&self) -> bool {
        self.config_path.is_some()
    }

    /// Loads the configuration
    ///
    /// An explicit `--config` file must exist. The default file is optional;
    /// defaults apply when it is absent, but a file that exists and does not
    /// parse is an error.
    pub fn load_config(&self) -> Result<Config> {
        let path = self.config_path();
        if self.has_explicit_config() || path.exists() {
            Config::load(&path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.format, self.quiet)
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

/// Per-command overrides of config file values
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub media_dir: Option<PathBuf>,
    pub secrets: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub throttle: Option<u64>,
}

impl Overrides {
    /// Applies the overrides and validates the result
    ///
    /// # Errors
    /// Every validation error, joined into one message
    pub fn apply(&self, config: Config) -> Result<Config> {
        let mut builder = ConfigBuilder::from_config(config);
        if let Some(dir) = &self.media_dir {
            builder = builder.media_root(dir.clone());
        }
        if let Some(secrets) = &self.secrets {
            builder = builder.auth_secrets_path(secrets.clone());
        }
        if let Some(log) = &self.log_file {
            builder = builder.upload_log_path(log.clone());
        }
        if let Some(seconds) = self.throttle {
            builder = builder.upload_throttle_secs(seconds);
        }

        builder.build_validated().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!("Invalid configuration: {}", messages.join("; "))
        })
    }
}

/// Loads the config and applies overrides, with context naming the file
pub fn resolve_config(ctx: &CommandContext, overrides: &Overrides) -> Result<Config> {
    let config = ctx
        .load_config()
        .with_context(|| format!("Failed to load configuration {}", ctx.config_path().display()))?;
    overrides.apply(config)
}
