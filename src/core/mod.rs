//! Core transformation stages.
//!
//! This module contains:
//! - Threshold flag derivation
//! - Trailing time-window aggregation
//! - The pipeline that runs load, index, flag, aggregate and write in order

pub mod flag;
pub mod pipeline;
pub mod rolling;

// Re-export commonly used types
pub use flag::{count_flagged, derive_flag};
pub use pipeline::Pipeline;
pub use rolling::{format_window, parse_window, ParseWindowError, RollingWindow};
