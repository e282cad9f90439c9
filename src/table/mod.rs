//! Tabular data model.
//!
//! This module contains:
//! - Timestamps and the shared timestamp index used as a table's row key
//! - Index-labelled series derived from table columns
//! - The table itself, with index promotion and column insertion

pub mod frame;
pub mod series;
pub mod timestamp;

// Re-export commonly used types
pub use frame::{format_float, parse_number, CellRenderer, Column, ColumnValues, Table};
pub use series::Series;
pub use timestamp::{Precision, Timestamp, TimestampIndex};
