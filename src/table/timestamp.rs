//! Timestamp values and the index built from them.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;

/// Naive date-time formats tried in order when parsing a cell.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M",
];

/// Date-only formats; these parse to midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Offset-bearing formats, normalized to UTC.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// A point in time with nanosecond precision and no time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    pub fn new(datetime: NaiveDateTime) -> Self {
        Self(datetime)
    }

    /// Parse a CSV cell. Returns `None` for empty or unrecognised text.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(Self(dt.naive_utc()));
        }
        for format in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(text, format) {
                return Some(Self(dt.naive_utc()));
            }
        }
        for format in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
                return Some(Self(dt));
            }
        }
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return date.and_hms_opt(0, 0, 0).map(Self);
            }
        }
        None
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Format with the given precision.
    pub fn format(&self, precision: Precision) -> String {
        let pattern = match precision {
            Precision::Date => "%Y-%m-%d",
            Precision::Seconds => "%Y-%m-%d %H:%M:%S",
            Precision::Micros => "%Y-%m-%d %H:%M:%S%.6f",
            Precision::Nanos => "%Y-%m-%d %H:%M:%S%.9f",
        };
        self.0.format(pattern).to_string()
    }

    /// `self - window`, or `None` if that falls outside the representable range.
    pub fn checked_sub(&self, window: Duration) -> Option<Self> {
        self.0.checked_sub_signed(window).map(Self)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let precision = Precision::for_values(std::slice::from_ref(self)).max(Precision::Seconds);
        f.write_str(&self.format(precision))
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(datetime: NaiveDateTime) -> Self {
        Self(datetime)
    }
}

/// Precision used when writing a column of timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precision {
    /// Every value is at midnight; only the date is written
    Date,
    Seconds,
    Micros,
    Nanos,
}

impl Precision {
    /// The coarsest precision that represents every value exactly.
    pub fn for_values(values: &[Timestamp]) -> Self {
        values
            .iter()
            .map(|ts| match ts.0.nanosecond() {
                0 if ts.0.num_seconds_from_midnight() == 0 => Precision::Date,
                0 => Precision::Seconds,
                n if n % 1_000 == 0 => Precision::Micros,
                _ => Precision::Nanos,
            })
            .max()
            .unwrap_or(Precision::Seconds)
    }
}

/// The ordered row key of a table.
///
/// Cloning shares the underlying storage, so a derived series can carry the
/// exact index of the series it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampIndex(Arc<[Timestamp]>);

impl TimestampIndex {
    pub fn new(values: Vec<Timestamp>) -> Self {
        Self(values.into())
    }

    /// True when both indexes label the same rows with the same times.
    pub fn is_aligned_with(&self, other: &TimestampIndex) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }

    pub fn precision(&self) -> Precision {
        Precision::for_values(&self.0)
    }
}

impl Deref for TimestampIndex {
    type Target = [Timestamp];

    fn deref(&self) -> &[Timestamp] {
        &self.0
    }
}
