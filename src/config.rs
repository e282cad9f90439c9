//! Configuration for the exceedance pipeline.

use crate::core::rolling::RollingWindow;
use crate::io::{LoadOptions, WriteOptions};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CSV file to read
    pub input_path: PathBuf,

    /// CSV file to write
    pub output_path: PathBuf,

    /// Column parsed as timestamps and promoted to the row key
    pub timestamp_column: String,

    /// Column compared against the threshold
    pub amplitude_column: String,

    /// Values strictly above this are flagged
    pub threshold: f64,

    /// Width of the trailing window
    #[serde(with = "window_serde")]
    pub window: Duration,

    /// Minimum observations a window needs to produce a value
    pub min_periods: usize,

    /// Name of the appended flag column
    pub flag_column: String,

    /// Name of the appended rolling-mean column
    pub rolling_column: String,

    /// Input encoding label (e.g. "sjis"); UTF-8 if unset
    pub encoding: Option<String>,

    /// Field delimiter for both input and output
    pub delimiter: char,

    /// Header cell written above the index column
    pub index_label: Option<String>,

    /// Where to save the run report as JSON, if anywhere
    pub report_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("./data_sample.csv"),
            output_path: PathBuf::from("./result.csv"),
            timestamp_column: "timestamp".to_string(),
            amplitude_column: "CH1_AmplMean_100".to_string(),
            threshold: 0.1,
            window: Duration::minutes(60),
            min_periods: 1,
            flag_column: "flag".to_string(),
            rolling_column: "rolling_mean".to_string(),
            encoding: None,
            delimiter: ',',
            index_label: None,
            report_path: None,
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, or from the default location
    /// if it exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let config_path = Self::config_path();
                if config_path.exists() {
                    Self::load_from(&config_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.display())))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;
        Ok(config)
    }

    /// Save configuration as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::IoError(e.to_string()))?;
            }
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the default configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("exceedance")
            .join("config.json")
    }

    /// Check values that serde alone cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        if self.window <= Duration::zero() {
            return Err(ConfigError::Invalid("window must be positive".to_string()));
        }
        if !self.delimiter.is_ascii() || self.delimiter == '"' || self.delimiter == '\n' {
            return Err(ConfigError::Invalid(format!(
                "unsupported delimiter {:?}",
                self.delimiter
            )));
        }
        if self.flag_column == self.rolling_column {
            return Err(ConfigError::Invalid(format!(
                "flag and rolling columns are both named {:?}",
                self.flag_column
            )));
        }
        if self.timestamp_column == self.amplitude_column {
            return Err(ConfigError::Invalid(format!(
                "{:?} cannot be both the timestamp and the amplitude column",
                self.timestamp_column
            )));
        }
        Ok(())
    }

    /// Options for the loader.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            parse_dates: vec![self.timestamp_column.clone()],
            encoding: self.encoding.clone(),
            delimiter: self.delimiter as u8,
        }
    }

    /// Options for the writer.
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            index_label: self.index_label.clone(),
            delimiter: self.delimiter as u8,
        }
    }

    /// The rolling window described by this configuration.
    pub fn rolling_window(&self) -> RollingWindow {
        RollingWindow::new(self.window).with_min_periods(self.min_periods)
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for window widths as offset strings ("60min").
mod window_serde {
    use crate::core::rolling::{format_window, parse_window};
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(window: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        format_window(*window).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse_window(&text).map_err(serde::de::Error::custom)
    }
}
