//! PhotoLift CLI - Command-line interface for PhotoLift
//!
//! Provides commands for:
//! - Migrating a local media tree into Google Photos
//! - Previewing what a migration would upload
//! - Authentication with Google
//! - Inspecting the configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use photolift_core::config::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod reporter;

use commands::{
    auth::AuthCommand, config::ConfigCommand, migrate::MigrateCommand, scan::ScanCommand,
    CommandContext,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "photolift",
    version,
    about = "Upload local photos and videos to Google Photos"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload every media file not yet recorded in the uploaded-log
    Migrate(MigrateCommand),
    /// List pending files and how each would be classified, without uploading
    Scan(ScanCommand),
    /// Authentication commands
    #[command(subcommand)]
    Auth(AuthCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ctx = CommandContext::new(format, cli.quiet, cli.config.clone());

    // The logging level may come from the config file, so read it before
    // the subscriber exists; commands load it again and report errors.
    let level = ctx
        .load_config()
        .map(|config| config.logging.level)
        .unwrap_or_else(|_| Config::default().logging.level);
    init_tracing(cli.verbose, cli.quiet, cli.json, &level);

    match cli.command {
        Commands::Migrate(cmd) => cmd.execute(&ctx).await,
        Commands::Scan(cmd) => cmd.execute(&ctx).await,
        Commands::Auth(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx).await,
    }
}

/// Installs the global subscriber on stderr
///
/// `RUST_LOG` wins over everything; otherwise `-v` raises the level and
/// `--quiet` lowers it to `warn`.
fn init_tracing(verbose: u8, quiet: bool, json: bool, config_level: &str) {
    let filter = match (verbose, quiet) {
        (0, true) => "warn",
        (0, false) => config_level,
        (1, _) => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
