//! Trailing time-window aggregation.
//!
//! A row at time `t` sees every earlier-or-same row whose timestamp lies in
//! `(t - width, t]`. Window membership depends on time distance, not on row
//! count, so irregularly sampled series are handled without resampling.

use crate::error::{PipelineError, Result};
use crate::table::{Series, TimestampIndex};
use chrono::Duration;

/// Error returned when a window string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWindowError(String);

impl std::fmt::Display for ParseWindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid window {:?}: expected <count><unit> with unit one of ns, us, ms, s, min, h, d",
            self.0
        )
    }
}

impl std::error::Error for ParseWindowError {}

/// Parse an offset string such as `60min`, `10S`, `500L` or `2h`.
///
/// A missing count means 1 (`min` is one minute).
pub fn parse_window(text: &str) -> std::result::Result<Duration, ParseWindowError> {
    let err = || ParseWindowError(text.to_string());
    let trimmed = text.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (count, unit) = trimmed.split_at(split);

    let count: i64 = if count.is_empty() {
        1
    } else {
        count.parse().map_err(|_| err())?
    };

    let duration = match unit.trim() {
        "ns" | "N" => Duration::nanoseconds(count),
        "us" | "U" => Duration::microseconds(count),
        "ms" | "L" => Duration::milliseconds(count),
        "s" | "S" | "sec" => Duration::try_seconds(count).ok_or_else(err)?,
        "min" | "T" => Duration::try_minutes(count).ok_or_else(err)?,
        "h" | "H" => Duration::try_hours(count).ok_or_else(err)?,
        "d" | "D" => Duration::try_days(count).ok_or_else(err)?,
        _ => return Err(err()),
    };
    Ok(duration)
}

/// Render a window width in the largest unit that divides it exactly,
/// preferring minutes over hours and days.
pub fn format_window(width: Duration) -> String {
    let nanos = match width.num_nanoseconds() {
        Some(n) => n,
        None => return format!("{}s", width.num_seconds()),
    };
    const UNITS: &[(i64, &str)] = &[
        (60_000_000_000, "min"),
        (1_000_000_000, "s"),
        (1_000_000, "ms"),
        (1_000, "us"),
    ];
    for &(size, unit) in UNITS {
        if nanos != 0 && nanos % size == 0 {
            return format!("{}{unit}", nanos / size);
        }
    }
    format!("{nanos}ns")
}

/// A trailing, right-inclusive time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingWindow {
    width: Duration,
    min_periods: usize,
}

impl RollingWindow {
    /// Create a window of the given width that needs one observation.
    pub fn new(width: Duration) -> Self {
        Self {
            width,
            min_periods: 1,
        }
    }

    /// Require at least `min_periods` non-NaN observations per window;
    /// rows with fewer get NaN.
    pub fn with_min_periods(mut self, min_periods: usize) -> Self {
        self.min_periods = min_periods;
        self
    }

    pub fn width(&self) -> Duration {
        self.width
    }

    pub fn min_periods(&self) -> usize {
        self.min_periods
    }

    /// Mean of the non-NaN values in each row's window.
    ///
    /// Runs in a single pass: the window start only moves forward, and a
    /// running sum and count are kept for the values inside it.
    pub fn mean<T>(&self, series: &Series<T>) -> Result<Series<f64>>
    where
        T: Copy + Into<f64>,
    {
        let index = series.index();
        check_monotonic(index)?;

        let values = series.values();
        let mut means = Vec::with_capacity(values.len());
        let mut start = 0;
        let mut sum = 0.0;
        let mut count = 0usize;

        for (i, (ts, &value)) in series.iter().enumerate() {
            let value: f64 = value.into();
            if !value.is_nan() {
                sum += value;
                count += 1;
            }

            if let Some(lower) = ts.checked_sub(self.width) {
                while start <= i && index[start] <= lower {
                    let old: f64 = values[start].into();
                    if !old.is_nan() {
                        sum -= old;
                        count -= 1;
                    }
                    start += 1;
                }
            }
            if count == 0 {
                sum = 0.0;
            }

            let mean = if count > 0 && count >= self.min_periods {
                sum / count as f64
            } else {
                f64::NAN
            };
            means.push(mean);
        }

        Series::new(index.clone(), means)
    }
}

/// Reject an index that goes backwards. Equal neighbours are allowed.
fn check_monotonic(index: &TimestampIndex) -> Result<()> {
    for (i, pair) in index.windows(2).enumerate() {
        if pair[1] < pair[0] {
            return Err(PipelineError::NonMonotonicIndex {
                row: i + 2,
                previous: pair[0],
                current: pair[1],
            });
        }
    }
    Ok(())
}
