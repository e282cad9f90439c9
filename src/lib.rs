//! Exceedance - threshold flags and trailing exceedance ratios for
//! timestamped CSV data.
//!
//! A single measurement column is compared against a fixed threshold. Each
//! row gets a 0/1 flag, and a trailing time-window mean of that flag gives
//! the fraction of recent samples above the threshold.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Exceedance                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐   │
//! │  │  Loader  │──▶│ Indexer  │──▶│   Flag   │──▶│ Rolling  │   │
//! │  │  (CSV)   │   │(set_index│   │ (v > th) │   │ (60min)  │   │
//! │  └──────────┘   └──────────┘   └──────────┘   └──────────┘   │
//! │                                                    │         │
//! │                                                    ▼         │
//! │                 ┌──────────┐                 ┌──────────┐    │
//! │                 │   Run    │◀────────────────│  Writer  │    │
//! │                 │  Report  │                 │  (CSV)   │    │
//! │                 └──────────┘                 └──────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use exceedance::{Config, Pipeline};
//!
//! // Reads ./data_sample.csv and writes ./result.csv
//! let pipeline = Pipeline::new(Config::default()).expect("invalid config");
//! let report = pipeline.run().expect("pipeline failed");
//! println!("{}", report.summary());
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod report;
pub mod table;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use self::core::{derive_flag, parse_window, Pipeline, RollingWindow};
pub use error::{PipelineError, Result};
pub use io::{load_csv, write_csv, LoadOptions, WriteOptions};
pub use report::RunReport;
pub use table::{Column, ColumnValues, Series, Table, Timestamp, TimestampIndex};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
