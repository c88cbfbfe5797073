//! Auth commands - Login, Logout, and Status for Google authentication
//!
//! Provides the `photolift auth` CLI subcommands which:
//! 1. `login`  - Runs the consent flow unconditionally and caches the token
//!    next to the client-secret file.
//! 2. `logout` - Deletes the cached token.
//! 3. `status` - Shows whether a cached token exists, its expiry and scopes.

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use photolift_photos::auth::{
    logout, token_status, OAuth2Config, OAuthCredentialProvider, StdinCodeExchanger,
};
use tracing::info;

use super::{resolve_config, CommandContext, Overrides};
use crate::output::OutputFormatter;

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Authorize PhotoLift with a Google account
    Login {
        /// Client-secret JSON file (overrides auth.secrets_path)
        #[arg(long, value_name = "FILE")]
        secrets: Option<PathBuf>,

        /// Print the authorization URL without opening a browser
        #[arg(long)]
        no_browser: bool,
    },
    /// Remove the cached token
    Logout,
    /// Check authentication status
    Status,
}

impl AuthCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let fmt = ctx.formatter();
        let secrets = match self {
            AuthCommand::Login { secrets, .. } => secrets.clone(),
            _ => None,
        };
        let overrides = Overrides {
            secrets,
            ..Default::default()
        };
        let config = match resolve_config(ctx, &overrides) {
            Ok(config) => config,
            Err(e) => {
                fmt.error(&format!("{:#}", e));
                return Ok(());
            }
        };
        let secrets_path = config.secrets_path();

        match self {
            AuthCommand::Login { no_browser, .. } => {
                let oauth = OAuth2Config::new()
                    .with_scopes(config.auth.scopes.clone())
                    .with_redirect_uri(config.auth.redirect_uri.clone());
                self.execute_login(&secrets_path, &oauth, !*no_browser, &*fmt)
                    .await
            }
            AuthCommand::Logout => self.execute_logout(&secrets_path, &*fmt).await,
            AuthCommand::Status => self.execute_status(&secrets_path, ctx, &*fmt).await,
        }
    }

    async fn execute_login(
        &self,
        secrets_path: &std::path::Path,
        oauth: &OAuth2Config,
        open_browser: bool,
        fmt: &dyn OutputFormatter,
    ) -> Result<()> {
        info!(secrets = %secrets_path.display(), "Starting login");
        let exchanger = StdinCodeExchanger::new(open_browser);

        match OAuthCredentialProvider::login(secrets_path, oauth, &exchanger).await {
            Ok(provider) => {
                fmt.success("Authenticated with Google Photos");
                fmt.info(&format!("Token cached at {}", provider.cache_path().display()));
            }
            Err(e) => fmt.error(&format!("Login failed: {:#}", e)),
        }
        Ok(())
    }

    async fn execute_logout(
        &self,
        secrets_path: &std::path::Path,
        fmt: &dyn OutputFormatter,
    ) -> Result<()> {
        if logout(secrets_path).await? {
            fmt.success("Logged out successfully");
            fmt.info("Cached token removed");
        } else {
            fmt.info("No cached token. Nothing to log out.");
        }
        Ok(())
    }

    async fn execute_status(
        &self,
        secrets_path: &std::path::Path,
        ctx: &CommandContext,
        fmt: &dyn OutputFormatter,
    ) -> Result<()> {
        let status = token_status(secrets_path).await?;

        if ctx.is_json() {
            let json = match &status {
                Some(status) => serde_json::json!({
                    "authenticated": true,
                    "cache_path": status.cache_path.display().to_string(),
                    "expires_at": status.expires_at.map(|t| t.to_rfc3339()),
                    "expired": status.expired,
                    "refreshable": status.refreshable,
                    "scopes": status.scopes,
                }),
                None => serde_json::json!({
                    "authenticated": false,
                    "secrets_path": secrets_path.display().to_string(),
                    "secrets_present": secrets_path.exists(),
                }),
            };
            fmt.print_json(&json);
            return Ok(());
        }

        let Some(status) = status else {
            fmt.info("Authentication status: Not configured");
            if !secrets_path.exists() {
                fmt.info(&format!(
                    "Client secrets not found at {}",
                    secrets_path.display()
                ));
            }
            fmt.info("Run 'photolift auth login' to authenticate");
            return Ok(());
        };

        let token_state = match (status.expired, status.refreshable) {
            (false, _) => "Valid",
            (true, true) => "Expired (will refresh)",
            (true, false) => "Expired",
        };
        fmt.success("Authenticated");
        fmt.info(&format!("Token status:  {}", token_state));
        match status.expires_at {
            Some(expires_at) => fmt.info(&format!(
                "Expires:       {}",
                expires_at.format("%Y-%m-%d %H:%M:%S UTC")
            )),
            None => fmt.info("Expires:       Unknown"),
        }
        fmt.info(&format!("Scopes:        {}", status.scopes.join(" ")));
        fmt.info(&format!("Cache file:    {}", status.cache_path.display()));

        Ok(())
    }
}
