//! Run reporting.
//!
//! Summarizes what a pipeline run read, flagged and wrote, for display on
//! the terminal and for saving alongside the output.

pub mod run;

// Re-export commonly used types
pub use run::RunReport;
