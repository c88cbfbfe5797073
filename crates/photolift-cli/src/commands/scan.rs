//! Scan command - Preview a migration without network access
//!
//! Lists the files a `migrate` run would attempt, in upload order, and
//! classifies each one the same way the upload pipeline does.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use photolift_core::domain::media::format_size;
use photolift_core::domain::MigrationError;
use photolift_core::usecases::{inspect_media, pending_files};
use photolift_local::{FileUploadLog, LocalMediaAdapter};
use serde::Serialize;

use super::{resolve_config, CommandContext, Overrides};

#[derive(Debug, Args)]
pub struct ScanCommand {
    /// Directory to scan (overrides media.root)
    #[arg(long, value_name = "DIR")]
    pub media_dir: Option<PathBuf>,

    /// Uploaded-log file (overrides upload.log_path)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Classification of one pending file
#[derive(Debug, Serialize)]
struct ScanEntry {
    path: PathBuf,
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl ScanCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let fmt = ctx.formatter();
        let overrides = Overrides {
            media_dir: self.media_dir.clone(),
            log_file: self.log_file.clone(),
            ..Default::default()
        };

        let config = match resolve_config(ctx, &overrides) {
            Ok(config) => config,
            Err(e) => {
                fmt.error(&format!("Initialization error: {:#}", e));
                return Ok(());
            }
        };
        let root = config.media_root();
        let media = LocalMediaAdapter::new();
        let upload_log = FileUploadLog::new(config.log_path());

        let files = match pending_files(&media, &upload_log, &root).await {
            Ok(files) => files,
            Err(MigrationError::DirectoryNotFound(path)) => {
                fmt.error(&format!("Directory not found: {}", path.display()));
                return Ok(());
            }
            Err(e) => {
                fmt.error(&format!("Initialization error: {:#}", e));
                return Ok(());
            }
        };

        let mut entries = Vec::with_capacity(files.len());
        for path in files {
            let entry = match inspect_media(&media, &path).await {
                Ok(file) => ScanEntry {
                    path,
                    accepted: true,
                    kind: Some(file.kind.to_string()),
                    mime_type: Some(file.mime_type),
                    size: Some(file.size),
                    reason: None,
                },
                Err(e) => ScanEntry {
                    path,
                    accepted: false,
                    kind: None,
                    mime_type: None,
                    size: None,
                    reason: Some(e.to_string()),
                },
            };
            entries.push(entry);
        }

        let accepted = entries.iter().filter(|e| e.accepted).count();
        let total_bytes: u64 = entries.iter().filter_map(|e| e.size).sum();

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "root": root.display().to_string(),
                "pending": entries.len(),
                "accepted": accepted,
                "rejected": entries.len() - accepted,
                "total_bytes": total_bytes,
                "files": entries,
            }));
            return Ok(());
        }

        if entries.is_empty() {
            fmt.success(&format!("No new media files found in {}", root.display()));
            return Ok(());
        }

        for entry in &entries {
            match (&entry.kind, &entry.mime_type, entry.size, &entry.reason) {
                (Some(kind), Some(mime), Some(size), _) => fmt.info(&format!(
                    "{}  ({}, {}, {})",
                    entry.path.display(),
                    kind,
                    mime,
                    format_size(size)
                )),
                (_, _, _, reason) => fmt.warn(&format!(
                    "{}: {}",
                    entry.path.display(),
                    reason.as_deref().unwrap_or("rejected")
                )),
            }
        }
        fmt.success(&format!(
            "{} pending, {} would be uploaded ({}), {} would be skipped",
            entries.len(),
            accepted,
            format_size(total_bytes),
            entries.len() - accepted
        ));

        Ok(())
    }
}
