//! Error types for the exceedance pipeline.

use crate::config::ConfigError;
use crate::table::Timestamp;
use std::path::PathBuf;

/// Result alias used throughout the pipeline.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised while loading, transforming or writing a table.
#[derive(Debug)]
pub enum PipelineError {
    /// Reading or writing a file failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The delimited text was malformed (or could not be written).
    Csv {
        path: PathBuf,
        source: csv::Error,
    },
    /// The configured encoding label is not recognised.
    UnknownEncoding(String),
    /// The input bytes are not valid in the configured encoding.
    Decode { path: PathBuf, encoding: String },
    /// The input has no header row.
    EmptyInput(PathBuf),
    /// A required column does not exist.
    MissingColumn(String),
    /// A column with this name already exists.
    DuplicateColumn(String),
    /// The column exists but does not hold timestamps.
    NotTimestampColumn(String),
    /// A cell could not be parsed as a timestamp.
    InvalidTimestamp {
        column: String,
        row: usize,
        value: String,
    },
    /// A cell could not be parsed as a number.
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },
    /// The row key goes backwards in time.
    NonMonotonicIndex {
        row: usize,
        previous: Timestamp,
        current: Timestamp,
    },
    /// A column or series does not have the table's row count.
    LengthMismatch { expected: usize, actual: usize },
    /// A series is indexed differently from the table it is joined to.
    IndexMismatch(String),
    /// An index-aligned operation was attempted before `set_index`.
    IndexNotSet,
    /// Invalid configuration.
    Config(ConfigError),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Io { path, .. } => write!(f, "I/O error on {}", path.display()),
            PipelineError::Csv { path, .. } => write!(f, "CSV error in {}", path.display()),
            PipelineError::UnknownEncoding(label) => write!(f, "Unknown encoding: {label}"),
            PipelineError::Decode { path, encoding } => {
                write!(f, "{} is not valid {encoding}", path.display())
            }
            PipelineError::EmptyInput(path) => {
                write!(f, "No header row found in {}", path.display())
            }
            PipelineError::MissingColumn(name) => write!(f, "Missing column: {name}"),
            PipelineError::DuplicateColumn(name) => {
                write!(f, "Cannot insert {name}, column already exists")
            }
            PipelineError::NotTimestampColumn(name) => {
                write!(f, "Column {name} is not a timestamp column")
            }
            PipelineError::InvalidTimestamp { column, row, value } => write!(
                f,
                "Invalid timestamp {value:?} in column {column} at data row {row}"
            ),
            PipelineError::InvalidNumber { column, row, value } => write!(
                f,
                "Invalid number {value:?} in column {column} at data row {row}"
            ),
            PipelineError::NonMonotonicIndex {
                row,
                previous,
                current,
            } => write!(
                f,
                "Index must be monotonic: data row {row} ({current}) precedes the row before it ({previous})"
            ),
            PipelineError::LengthMismatch { expected, actual } => {
                write!(f, "Length mismatch: expected {expected} rows, got {actual}")
            }
            PipelineError::IndexMismatch(name) => {
                write!(f, "Series {name} is not aligned with the table index")
            }
            PipelineError::IndexNotSet => write!(f, "Table has no timestamp index"),
            PipelineError::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Io { source, .. } => Some(source),
            PipelineError::Csv { source, .. } => Some(source),
            PipelineError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(e: ConfigError) -> Self {
        PipelineError::Config(e)
    }
}
