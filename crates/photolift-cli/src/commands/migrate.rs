//! Migrate command - Upload a media tree to Google Photos
//!
//! Provides the `photolift migrate` CLI command which:
//! 1. Loads configuration and applies flag overrides
//! 2. Acquires credentials (cache, refresh, or interactive consent)
//! 3. Creates the adapters (Photos Library, local media, uploaded-log)
//! 4. Runs the MigrateUseCase and prints a summary
//!
//! Initialization failures are printed and the command still returns
//! normally.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use photolift_core::domain::MigrationError;
use photolift_core::usecases::{MigrateUseCase, UploadMediaUseCase};
use photolift_local::{FileUploadLog, LocalMediaAdapter};
use photolift_photos::auth::{OAuth2Config, OAuthCredentialProvider, StdinCodeExchanger};
use photolift_photos::client::PhotosClient;
use photolift_photos::provider::PhotosLibraryProvider;
use tracing::info;

use super::{resolve_config, CommandContext, Overrides};
use crate::reporter::ConsoleReporter;

#[derive(Debug, Args)]
pub struct MigrateCommand {
    /// Directory to migrate (overrides media.root)
    #[arg(long, value_name = "DIR")]
    pub media_dir: Option<PathBuf>,

    /// Client-secret JSON file (overrides auth.secrets_path)
    #[arg(long, value_name = "FILE")]
    pub secrets: Option<PathBuf>,

    /// Uploaded-log file (overrides upload.log_path)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Seconds to wait before each file (overrides upload.throttle_secs)
    #[arg(long, value_name = "SECS")]
    pub throttle: Option<u64>,

    /// Print the authorization URL without opening a browser
    #[arg(long)]
    pub no_browser: bool,
}

impl MigrateCommand {
    fn overrides(&self) -> Overrides {
        Overrides {
            media_dir: self.media_dir.clone(),
            secrets: self.secrets.clone(),
            log_file: self.log_file.clone(),
            throttle: self.throttle,
        }
    }

    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let fmt = ctx.formatter();

        // Step 1: Load config
        let config = match resolve_config(ctx, &self.overrides()) {
            Ok(config) => config,
            Err(e) => {
                fmt.error(&format!("Initialization error: {:#}", e));
                return Ok(());
            }
        };
        let root = config.media_root();
        let secrets_path = config.secrets_path();
        let log_path = config.log_path();

        info!(
            root = %root.display(),
            secrets = %secrets_path.display(),
            log = %log_path.display(),
            throttle_secs = config.upload.throttle_secs,
            "Loaded configuration"
        );

        // Step 2: Credentials
        let oauth = OAuth2Config::new()
            .with_scopes(config.auth.scopes.clone())
            .with_redirect_uri(config.auth.redirect_uri.clone());
        let exchanger = StdinCodeExchanger::new(!self.no_browser);
        let credentials =
            match OAuthCredentialProvider::acquire(&secrets_path, &oauth, &exchanger).await {
                Ok(provider) => Arc::new(provider),
                Err(e) => {
                    fmt.error(&format!("Initialization error: {:#}", e));
                    return Ok(());
                }
            };

        // Step 3: Adapters
        let client = PhotosClient::with_endpoints(
            config.upload.upload_url.clone(),
            config.upload.api_base_url.clone(),
        );
        let library = Arc::new(PhotosLibraryProvider::new(client));
        let media = Arc::new(LocalMediaAdapter::new());
        let upload_log = Arc::new(FileUploadLog::new(log_path));
        let reporter = Arc::new(ConsoleReporter::new(
            ctx.format,
            ctx.quiet,
            config.logging.show_all_output,
            root.clone(),
        ));

        let pipeline = Arc::new(UploadMediaUseCase::new(
            credentials,
            library,
            media.clone(),
            upload_log.clone(),
            reporter.clone(),
        ));
        let usecase = MigrateUseCase::new(pipeline, media, upload_log, reporter, config.throttle());

        // Step 4: Run
        let stats = match usecase.run(&root).await {
            Ok(stats) => stats,
            Err(MigrationError::DirectoryNotFound(path)) => {
                fmt.error(&format!("Directory not found: {}", path.display()));
                return Ok(());
            }
            Err(e) => {
                fmt.error(&format!("Initialization error: {:#}", e));
                return Ok(());
            }
        };

        // Step 5: Results
        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "root": root.display().to_string(),
                "attempted": stats.attempted,
                "succeeded": stats.succeeded,
                "skipped": stats.skipped,
                "rate_limited": stats.rate_limited,
                "failed": stats.failed,
                "success_rate": stats.success_rate(),
                "elapsed_secs": stats.elapsed.as_secs_f64(),
            }));
        } else if stats.attempted > 0 {
            if stats.skipped > 0 {
                fmt.info(&format!("Skipped:      {}", stats.skipped));
            }
            if stats.rate_limited > 0 {
                fmt.info(&format!(
                    "Rate limited: {} (retried on the next run)",
                    stats.rate_limited
                ));
            }
            if stats.failed > 0 {
                fmt.info(&format!("Failed:       {}", stats.failed));
            }
        }

        Ok(())
    }
}
