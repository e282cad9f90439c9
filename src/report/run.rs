//! Statistics describing a single pipeline run.

use crate::core::flag::count_flagged;
use crate::core::rolling::format_window;
use crate::table::{Series, Timestamp};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::path::{Path, PathBuf};

/// What a run read, flagged and wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Data rows read (and written)
    pub rows: usize,
    /// Rows whose amplitude exceeded the threshold
    pub flagged_rows: usize,
    /// Rows whose amplitude was missing or NaN
    pub nan_amplitudes: usize,
    /// `flagged_rows / rows`, absent for an empty input
    pub exceedance_ratio: Option<f64>,
    /// Average of the defined rolling-mean values
    pub rolling_mean_avg: Option<f64>,
    /// Largest rolling-mean value
    pub rolling_mean_max: Option<f64>,
    pub first_timestamp: Option<Timestamp>,
    pub last_timestamp: Option<Timestamp>,
    pub threshold: f64,
    pub window: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

/// Inputs for building a report.
pub struct RunOutcome<'a> {
    pub input_path: &'a Path,
    pub output_path: &'a Path,
    pub amplitude: &'a Series<f64>,
    pub flag: &'a Series<u8>,
    pub rolling_mean: &'a Series<f64>,
    pub threshold: f64,
    pub window: Duration,
    pub started_at: DateTime<Utc>,
}

impl RunReport {
    /// Build a report from the series a run produced.
    pub fn from_outcome(outcome: RunOutcome<'_>) -> Self {
        let rows = outcome.flag.len();
        let flagged_rows = count_flagged(outcome.flag);
        let nan_amplitudes = outcome
            .amplitude
            .values()
            .iter()
            .filter(|v| v.is_nan())
            .count();

        let defined: Vec<f64> = outcome
            .rolling_mean
            .values()
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .collect();
        let (rolling_mean_avg, rolling_mean_max) = if defined.is_empty() {
            (None, None)
        } else {
            (
                Some(Statistics::mean(defined.iter())),
                Some(Statistics::max(defined.iter())),
            )
        };

        let index = outcome.flag.index();

        Self {
            input_path: outcome.input_path.to_path_buf(),
            output_path: outcome.output_path.to_path_buf(),
            rows,
            flagged_rows,
            nan_amplitudes,
            exceedance_ratio: (rows > 0).then(|| flagged_rows as f64 / rows as f64),
            rolling_mean_avg,
            rolling_mean_max,
            first_timestamp: index.first().copied(),
            last_timestamp: index.last().copied(),
            threshold: outcome.threshold,
            window: format_window(outcome.window),
            started_at: outcome.started_at,
            elapsed_ms: elapsed_ms_since(outcome.started_at),
        }
    }

    /// Stamp the time elapsed since the run started. Call once the output
    /// has been written.
    pub fn finish(&mut self) {
        self.elapsed_ms = elapsed_ms_since(self.started_at);
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let optional = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"));
        let span = match (self.first_timestamp, self.last_timestamp) {
            (Some(first), Some(last)) => format!("{first} .. {last}"),
            _ => "n/a".to_string(),
        };

        format!(
            "Run Summary:\n\
             - Input: {}\n\
             - Output: {}\n\
             - Rows: {}\n\
             - Time span: {}\n\
             - Threshold: {} (window {})\n\
             - Flagged rows: {}\n\
             - Missing amplitudes: {}\n\
             - Exceedance ratio: {}\n\
             - Rolling mean (avg / max): {} / {}\n\
             - Elapsed: {} ms",
            self.input_path.display(),
            self.output_path.display(),
            self.rows,
            span,
            self.threshold,
            self.window,
            self.flagged_rows,
            self.nan_amplitudes,
            optional(self.exceedance_ratio),
            optional(self.rolling_mean_avg),
            optional(self.rolling_mean_max),
            self.elapsed_ms
        )
    }

    /// Save the report as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

fn elapsed_ms_since(started_at: DateTime<Utc>) -> u64 {
    (Utc::now() - started_at).num_milliseconds().max(0) as u64
}
