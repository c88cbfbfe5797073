//! Per-run statistics and ETA estimation

use std::time::Duration;

use serde::Serialize;

use super::errors::UploadError;

/// Counters for a single migration run
///
/// Transient: created when a run starts and discarded at exit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    /// Number of files handed to the upload pipeline
    pub attempted: usize,
    /// Files uploaded and recorded in the uploaded-log
    pub succeeded: usize,
    /// Files rejected by validation (never touched the network)
    pub skipped: usize,
    /// Files that hit HTTP 429 on upload or finalize
    pub rate_limited: usize,
    /// Files that failed for any other reason
    pub failed: usize,
    /// Wall-clock time spent in the upload loop
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

impl RunStats {
    /// Records the outcome of one file
    pub fn record<T>(&mut self, outcome: &Result<T, UploadError>) {
        self.attempted += 1;
        match outcome {
            Ok(_) => self.succeeded += 1,
            Err(e) if e.is_validation() => self.skipped += 1,
            Err(e) if e.is_rate_limited() => self.rate_limited += 1,
            Err(_) => self.failed += 1,
        }
    }

    /// Percentage of attempted files that succeeded (0.0 when nothing was attempted)
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.attempted as f64 * 100.0
    }

    /// One-line summary, e.g. `3/4 uploaded successfully (75.00%)`
    pub fn summary(&self) -> String {
        format!(
            "{}/{} uploaded successfully ({:.2}%)",
            self.succeeded,
            self.attempted,
            self.success_rate()
        )
    }
}

/// Estimates the time left after `done` of `total` files took `elapsed`
///
/// Uses the arithmetic mean of the per-file time so far multiplied by the
/// number of files not yet finished. Returns `None` before the first file
/// completes.
pub fn estimate_remaining(elapsed: Duration, done: usize, total: usize) -> Option<Duration> {
    if done == 0 {
        return None;
    }
    let remaining = total.saturating_sub(done) as u32;
    let average = elapsed / done as u32;
    Some(average * remaining)
}

/// Formats a duration as `H:MM:SS`, or `N day(s), H:MM:SS` past a day
///
/// Fractional seconds are truncated.
pub fn format_eta(duration: Duration) -> String {
    let total = duration.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let clock = format!("{}:{:02}:{:02}", hours, minutes, seconds);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }
}
