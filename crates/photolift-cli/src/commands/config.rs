//! Config command - View and validate PhotoLift configuration
//!
//! Provides the `photolift config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON)
//! 2. Validates the configuration file and reports errors
//! 3. Prints the configuration file location

use anyhow::{Context, Result};
use clap::Subcommand;
use photolift_core::config::Config;
use tracing::info;

use super::CommandContext;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Validate the configuration file
    Validate,
    /// Print the configuration file path
    Path,
}

impl ConfigCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(ctx),
            ConfigCommand::Validate => self.execute_validate(ctx),
            ConfigCommand::Path => self.execute_path(ctx),
        }
    }

    fn execute_show(&self, ctx: &CommandContext) -> Result<()> {
        let fmt = ctx.formatter();
        let config_path = ctx.config_path();

        let config = match ctx.load_config() {
            Ok(config) => config,
            Err(e) => {
                fmt.error(&format!("{:#}", e));
                return Ok(());
            }
        };

        info!(config_path = %config_path.display(), "Showing configuration");

        if ctx.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            fmt.print_json(&json);
        } else {
            let source = if config_path.exists() {
                config_path.display().to_string()
            } else {
                "defaults".to_string()
            };
            fmt.success(&format!("Configuration ({})", source));
            fmt.info("");

            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                fmt.info(line);
            }
        }

        Ok(())
    }

    fn execute_validate(&self, ctx: &CommandContext) -> Result<()> {
        let fmt = ctx.formatter();
        let config_path = ctx.config_path();

        if !config_path.exists() {
            if ctx.is_json() {
                fmt.print_json(&serde_json::json!({
                    "valid": !ctx.has_explicit_config(),
                    "config_path": config_path.display().to_string(),
                    "errors": ["Configuration file not found"],
                }));
            } else if ctx.has_explicit_config() {
                fmt.error(&format!(
                    "Configuration file not found at {}",
                    config_path.display()
                ));
            } else {
                fmt.info(&format!(
                    "Configuration file not found at {}",
                    config_path.display()
                ));
                fmt.info("Using default configuration.");
            }
            return Ok(());
        }

        let config = match Config::load(&config_path) {
            Ok(config) => config,
            Err(e) => {
                if ctx.is_json() {
                    fmt.print_json(&serde_json::json!({
                        "valid": false,
                        "config_path": config_path.display().to_string(),
                        "errors": [format!("{:#}", e)],
                    }));
                } else {
                    fmt.error(&format!("{:#}", e));
                }
                return Ok(());
            }
        };

        info!(config_path = %config_path.display(), "Validating configuration");
        let errors = config.validate();

        if ctx.is_json() {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            fmt.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": config_path.display().to_string(),
                "errors": error_strings,
            }));
        } else if errors.is_empty() {
            fmt.success("Configuration is valid");
            fmt.info(&format!("File: {}", config_path.display()));
        } else {
            fmt.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            fmt.info(&format!("File: {}", config_path.display()));
            for error in &errors {
                fmt.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        Ok(())
    }

    fn execute_path(&self, ctx: &CommandContext) -> Result<()> {
        let config_path = ctx.config_path();
        if ctx.is_json() {
            ctx.formatter().print_json(&serde_json::json!({
                "config_path": config_path.display().to_string(),
                "exists": config_path.exists(),
            }));
        } else {
            // Bare path so it can be used in shell substitutions
            println!("{}", config_path.display());
        }
        Ok(())
    }
}
