//! The load, index, flag, aggregate and write sequence.

use crate::config::Config;
use crate::core::flag::derive_flag;
use crate::core::rolling::format_window;
use crate::error::{PipelineError, Result};
use crate::io::{load_csv, write_csv};
use crate::report::run::{RunOutcome, RunReport};
use crate::table::Table;
use chrono::Utc;

/// Runs the stages for one configuration.
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Create a pipeline after validating `config`.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read the configured input, promote the timestamp column, append the
    /// flag and rolling-mean columns, and write the result (plus the run
    /// report, if a report path is configured).
    pub fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();
        let config = &self.config;

        tracing::info!(path = %config.input_path.display(), "Loading input");
        let mut table = load_csv(&config.input_path, &config.load_options())?;

        let mut report = self.transform(&mut table, started_at)?;

        tracing::info!(
            path = %config.output_path.display(),
            rows = table.num_rows(),
            columns = table.num_columns(),
            "Writing output"
        );
        write_csv(&table, &config.output_path, &config.write_options())?;
        report.finish();

        if let Some(ref path) = config.report_path {
            report.save(path).map_err(|source| PipelineError::Io {
                path: path.clone(),
                source,
            })?;
            tracing::info!(path = %path.display(), "Saved run report");
        }

        Ok(report)
    }

    /// Apply the in-memory stages to a freshly loaded table.
    pub fn transform(
        &self,
        table: &mut Table,
        started_at: chrono::DateTime<Utc>,
    ) -> Result<RunReport> {
        let config = &self.config;

        table.set_index(&config.timestamp_column)?;

        let amplitude = table.series_f64(&config.amplitude_column)?;
        let flag = derive_flag(&amplitude, config.threshold);
        tracing::debug!(
            column = %config.amplitude_column,
            threshold = config.threshold,
            "Derived flag"
        );

        let window = config.rolling_window();
        let rolling_mean = window.mean(&flag)?;
        tracing::debug!(
            window = %format_window(window.width()),
            min_periods = window.min_periods(),
            "Computed rolling mean"
        );

        let report = RunReport::from_outcome(RunOutcome {
            input_path: &config.input_path,
            output_path: &config.output_path,
            amplitude: &amplitude,
            flag: &flag,
            rolling_mean: &rolling_mean,
            threshold: config.threshold,
            window: config.window,
            started_at,
        });

        table.push_series(&config.flag_column, flag)?;
        table.push_series(&config.rolling_column, rolling_mean)?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_table;
    use std::path::Path;

    fn transform(text: &str, config: Config) -> Result<(Table, RunReport)> {
        let mut table = read_table(text.as_bytes(), &config.load_options(), Path::new("in.csv"))?;
        let report = Pipeline::new(config)?.transform(&mut table, Utc::now())?;
        Ok((table, report))
    }

    #[test]
    fn test_transform_appends_columns_in_order() {
        let (table, report) = transform(
            "timestamp,CH1_AmplMean_100,other\n\
             2024-01-01 00:00:00,0.05,a\n\
             2024-01-01 00:30:00,0.2,b\n\
             2024-01-01 01:00:00,0.3,c\n",
            Config::default(),
        )
        .unwrap();

        assert_eq!(
            table.column_names(),
            vec!["CH1_AmplMean_100", "other", "flag", "rolling_mean"]
        );
        assert_eq!(table.num_rows(), 3);
        assert_eq!(report.flagged_rows, 2);

        let flag = table.column("flag").unwrap();
        let mean = table.column("rolling_mean").unwrap();
        assert_eq!(flag.cell(0), "0");
        assert_eq!(flag.cell(1), "1");
        assert_eq!(flag.cell(2), "1");
        assert_eq!(mean.cell(0), "0.0");
        assert_eq!(mean.cell(1), "0.5");
        assert_eq!(mean.cell(2), "1.0");
    }

    #[test]
    fn test_custom_column_names() {
        let mut config = Config::default();
        config.amplitude_column = "v".to_string();
        config.flag_column = "over".to_string();
        config.rolling_column = "ratio".to_string();

        let (table, _) = transform("timestamp,v\n2024-01-01,1\n", config).unwrap();
        assert_eq!(table.column_names(), vec!["v", "over", "ratio"]);
    }

    #[test]
    fn test_missing_amplitude_column() {
        let err = transform("timestamp,x\n2024-01-01,1\n", Config::default()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(name) if name == "CH1_AmplMean_100"));
    }

    #[test]
    fn test_existing_flag_column_conflicts() {
        let err = transform(
            "timestamp,CH1_AmplMean_100,flag\n2024-01-01,1,x\n",
            Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateColumn(name) if name == "flag"));
    }

    #[test]
    fn test_min_periods_from_config() {
        let mut config = Config::default();
        config.min_periods = 2;

        let (table, report) = transform(
            "timestamp,CH1_AmplMean_100\n\
             2024-01-01 00:00:00,0.5\n\
             2024-01-01 00:30:00,0.05\n",
            config,
        )
        .unwrap();

        let mean = table.column("rolling_mean").unwrap();
        assert_eq!(mean.cell(0), "");
        assert_eq!(mean.cell(1), "0.5");
        assert_eq!(report.rolling_mean_max, Some(0.5));
    }

    #[test]
    fn test_run_elapsed_covers_write() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("in.csv");
        std::fs::write(&input_path, "timestamp,CH1_AmplMean_100\n2024-01-01,0.5\n").unwrap();

        let config = Config {
            input_path,
            output_path: dir.path().join("out.csv"),
            ..Config::default()
        };
        let started = Utc::now();
        let report = Pipeline::new(config).unwrap().run().unwrap();

        assert!(report.started_at >= started);
        assert!(report.elapsed_ms <= (Utc::now() - started).num_milliseconds() as u64);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.threshold = f64::INFINITY;
        assert!(matches!(
            Pipeline::new(config),
            Err(PipelineError::Config(_))
        ));
    }
}
