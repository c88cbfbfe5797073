//! Console implementation of [`IMigrationReporter`]
//!
//! Human mode prints one line per event and draws a byte progress bar while
//! a file uploads. With `show_all_output: false` the terminal is cleared
//! before each file so only the previous success and the current file stay
//! on screen. JSON mode emits one event object per finished file and never
//! draws bars.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use photolift_core::domain::media::format_size;
use photolift_core::domain::{format_eta, MediaFile, RunStats, UploadError};
use photolift_core::ports::IMigrationReporter;
use serde_json::json;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

const BAR_TEMPLATE: &str = "{spinner:.green} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

#[derive(Default)]
struct ReporterState {
    bar: Option<ProgressBar>,
    pending_eta: Option<String>,
}

/// Reports migration progress on the terminal
pub struct ConsoleReporter {
    fmt: Box<dyn OutputFormatter>,
    format: OutputFormat,
    quiet: bool,
    show_all_output: bool,
    root: PathBuf,
    state: Mutex<ReporterState>,
}

impl ConsoleReporter {
    pub fn new(format: OutputFormat, quiet: bool, show_all_output: bool, root: PathBuf) -> Self {
        Self {
            fmt: get_formatter(format, quiet),
            format,
            quiet,
            show_all_output,
            root,
            state: Mutex::new(ReporterState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ReporterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    fn bars_enabled(&self) -> bool {
        self.is_human() && !self.quiet
    }

    fn clear_screen(&self) {
        let term = Term::stdout();
        if self.is_human() && term.is_term() {
            if let Err(e) = term.clear_screen() {
                tracing::debug!(error = %e, "Failed to clear terminal");
            }
        }
    }

    fn finish_bar(&self) {
        if let Some(bar) = self.state().bar.take() {
            bar.finish_and_clear();
        }
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .map(|style| style.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Short outcome label used in JSON events
fn outcome_label(outcome: &Result<MediaFile, UploadError>) -> &'static str {
    match outcome {
        Ok(_) => "uploaded",
        Err(e) if e.is_validation() => "skipped",
        Err(e) if e.is_rate_limited() => "rate_limited",
        Err(_) => "failed",
    }
}

impl IMigrationReporter for ConsoleReporter {
    fn nothing_to_upload(&self) {
        self.fmt
            .success(&format!("No new media files found in {}", self.root.display()));
    }

    fn run_started(&self, total: usize) {
        self.fmt.info(&format!(
            "Found {} media files to upload. Beginning upload...",
            total
        ));
    }

    fn eta(&self, remaining: Duration, files_left: usize) {
        let line = format!(
            "ETA: {} remaining ({} files left)",
            format_eta(remaining),
            files_left
        );
        if self.show_all_output {
            self.fmt.info(&line);
        } else {
            // Printed after the screen is cleared for the next file
            self.state().pending_eta = Some(line);
        }
    }

    fn file_started(
        &self,
        index: usize,
        total: usize,
        path: &Path,
        last_success: Option<&Path>,
    ) {
        let pending_eta = self.state().pending_eta.take();

        if !self.show_all_output {
            self.clear_screen();
        }
        if let Some(previous) = last_success {
            self.fmt
                .info(&format!("Previous upload: {}", previous.display()));
        }
        if let Some(eta) = pending_eta {
            self.fmt.info(&eta);
        }
        self.fmt.info(&format!(
            "[{}/{}] Starting upload: {}",
            index + 1,
            total,
            path.display()
        ));
    }

    fn upload_started(&self, file: &MediaFile) {
        self.fmt
            .info(&format!("Uploading file ({})...", format_size(file.size)));
        if self.bars_enabled() {
            let bar = ProgressBar::new(file.size);
            bar.set_style(bar_style());
            self.state().bar = Some(bar);
        }
    }

    fn upload_progress(&self, _file: &MediaFile, sent: u64, _total: u64) {
        if let Some(bar) = &self.state().bar {
            bar.set_position(sent);
        }
    }

    fn upload_finished(&self, _file: &MediaFile) {
        self.finish_bar();
    }

    fn finalizing(&self, _file: &MediaFile) {
        self.fmt.info("Finalizing upload (batchCreate)...");
    }

    fn file_finished(&self, path: &Path, outcome: &Result<MediaFile, UploadError>) {
        // A failed upload leaves its bar behind
        self.finish_bar();

        match outcome {
            Ok(_) => {
                self.fmt
                    .success(&format!("Successfully uploaded: {}", path.display()));
            }
            Err(e) if e.is_validation() => {
                self.fmt.warn(&format!("Skipping {}: {}", path.display(), e));
            }
            Err(e) if e.is_rate_limited() => {
                self.fmt.warn(&format!("Skipping {}: {}", path.display(), e));
            }
            Err(e) => {
                self.fmt.error(&format!("{}: {}", path.display(), e));
            }
        }

        self.fmt.event(&json!({
            "event": "file",
            "path": path.display().to_string(),
            "outcome": outcome_label(outcome),
            "error": outcome.as_ref().err().map(|e| e.to_string()),
        }));
    }

    fn run_finished(&self, stats: &RunStats) {
        if self.is_human() {
            self.fmt
                .success(&format!("Upload Summary: {}", stats.summary()));
        }
    }
}
