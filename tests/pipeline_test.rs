//! End-to-end tests for the exceedance pipeline

use exceedance::{Config, Pipeline, PipelineError};
use std::path::{Path, PathBuf};

const SCENARIO: &str = "\
timestamp,CH1_AmplMean_100,CH2_AmplMean_100
2024-01-01 00:00:00,0.05,1.5
2024-01-01 00:30:00,0.2,1.6
2024-01-01 01:00:00,0.3,1.7
";

fn config_for(dir: &Path, input: &str) -> Config {
    let input_path = dir.join("data_sample.csv");
    std::fs::write(&input_path, input).unwrap();

    Config {
        input_path,
        output_path: dir.join("result.csv"),
        ..Config::default()
    }
}

fn run(config: Config) -> Result<String, PipelineError> {
    let output: PathBuf = config.output_path.clone();
    Pipeline::new(config)?.run()?;
    Ok(std::fs::read_to_string(output).unwrap())
}

/// Parse written output into header and rows of cells.
fn parse_output(text: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut lines = text.lines();
    let header = lines
        .next()
        .unwrap()
        .split(',')
        .map(str::to_string)
        .collect();
    let rows = lines
        .map(|l| l.split(',').map(str::to_string).collect())
        .collect();
    (header, rows)
}

#[test]
fn test_end_to_end_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(config_for(dir.path(), SCENARIO)).unwrap();

    assert_eq!(
        output,
        ",CH1_AmplMean_100,CH2_AmplMean_100,flag,rolling_mean\n\
         2024-01-01 00:00:00,0.05,1.5,0,0.0\n\
         2024-01-01 00:30:00,0.2,1.6,1,0.5\n\
         2024-01-01 01:00:00,0.3,1.7,1,1.0\n"
    );
}

#[test]
fn test_row_count_and_column_append_invariants() {
    let dir = tempfile::tempdir().unwrap();
    let input = "\
note,timestamp,CH1_AmplMean_100,extra
a,2024-01-01 00:00:00,0.5,x
b,2024-01-01 00:05:00,0.01,y
c,2024-01-01 00:07:30,0.2,z
d,2024-01-01 02:00:00,0.0,w
";
    let output = run(config_for(dir.path(), input)).unwrap();
    let (header, rows) = parse_output(&output);

    assert_eq!(
        header,
        vec!["", "note", "CH1_AmplMean_100", "extra", "flag", "rolling_mean"]
    );
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.len() == header.len()));
}

#[test]
fn test_flag_matches_threshold_and_mean_is_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let amplitudes = [0.1, 0.0999, 0.1001, 0.5, 0.1, 0.0, 0.3, 0.1, 0.2, 0.05];
    let mut input = String::from("timestamp,CH1_AmplMean_100\n");
    for (i, a) in amplitudes.iter().enumerate() {
        input.push_str(&format!("2024-01-01 {:02}:{:02}:00,{a}\n", i * 17 / 60, i * 17 % 60));
    }

    let output = run(config_for(dir.path(), &input)).unwrap();
    let (_, rows) = parse_output(&output);

    for (row, a) in rows.iter().zip(amplitudes) {
        let expected = if a > 0.1 { "1" } else { "0" };
        assert_eq!(row[2], expected, "amplitude {a}");
        let mean: f64 = row[3].parse().unwrap();
        assert!((0.0..=1.0).contains(&mean));
    }
    // Exactly 0.1 is not an exceedance
    assert_eq!(rows[0][2], "0");
    // The first row's window is just itself
    assert_eq!(rows[0][3], "0.0");
}

#[test]
fn test_rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), SCENARIO);

    let first = run(config.clone()).unwrap();
    let second = run(config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_header_only_input() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(config_for(dir.path(), "timestamp,CH1_AmplMean_100\n")).unwrap();

    assert_eq!(output, ",CH1_AmplMean_100,flag,rolling_mean\n");
}

#[test]
fn test_nan_amplitude_flags_zero_and_counts_in_mean() {
    let dir = tempfile::tempdir().unwrap();
    let input = "\
timestamp,CH1_AmplMean_100
2024-01-01 00:00:00,0.5
2024-01-01 00:10:00,NaN
2024-01-01 00:20:00,
";
    let output = run(config_for(dir.path(), input)).unwrap();

    assert_eq!(
        output,
        ",CH1_AmplMean_100,flag,rolling_mean\n\
         2024-01-01 00:00:00,0.5,1,1.0\n\
         2024-01-01 00:10:00,NaN,0,0.5\n\
         2024-01-01 00:20:00,,0,0.3333333333333333\n"
    );
}

#[test]
fn test_non_monotonic_timestamps_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = "\
timestamp,CH1_AmplMean_100
2024-01-01 01:00:00,0.5
2024-01-01 00:00:00,0.5
";
    let err = run(config_for(dir.path(), input)).unwrap_err();
    assert!(matches!(err, PipelineError::NonMonotonicIndex { row: 2, .. }));
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        input_path: dir.path().join("absent.csv"),
        output_path: dir.path().join("result.csv"),
        ..Config::default()
    };

    let err = run(config).unwrap_err();
    assert!(matches!(err, PipelineError::Io { .. }));
    assert!(!dir.path().join("result.csv").exists());
}

#[test]
fn test_non_numeric_amplitude() {
    let dir = tempfile::tempdir().unwrap();
    let input = "timestamp,CH1_AmplMean_100\n2024-01-01 00:00:00,high\n";

    let err = run(config_for(dir.path(), input)).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidNumber { row: 1, .. }));
}

#[test]
fn test_shift_jis_input() {
    let dir = tempfile::tempdir().unwrap();
    let text = "timestamp,CH1_AmplMean_100,備考\n2024-01-01 00:00:00,0.2,計測\n";
    let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(text);
    let input_path = dir.path().join("sjis.csv");
    std::fs::write(&input_path, &bytes).unwrap();

    let config = Config {
        input_path,
        output_path: dir.path().join("result.csv"),
        encoding: Some("sjis".to_string()),
        ..Config::default()
    };
    let output = run(config).unwrap();

    assert_eq!(
        output,
        ",CH1_AmplMean_100,備考,flag,rolling_mean\n2024-01-01 00:00:00,0.2,計測,1,1.0\n"
    );
}

#[test]
fn test_report_saved_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path(), SCENARIO);
    let report_path = dir.path().join("report.json");
    config.report_path = Some(report_path.clone());

    let report = Pipeline::new(config).unwrap().run().unwrap();
    assert_eq!(report.rows, 3);
    assert_eq!(report.flagged_rows, 2);

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(saved["rows"], 3);
    assert_eq!(saved["window"], "60min");
}

#[test]
fn test_daily_input_writes_dates_only() {
    let dir = tempfile::tempdir().unwrap();
    let input = "\
timestamp,CH1_AmplMean_100
2024-01-01,0.5
2024-01-02,0.05
";
    let output = run(config_for(dir.path(), input)).unwrap();

    assert_eq!(
        output,
        ",CH1_AmplMean_100,flag,rolling_mean\n\
         2024-01-01,0.5,1,1.0\n\
         2024-01-02,0.05,0,0.0\n"
    );
}

#[test]
fn test_passthrough_cells_written_as_read() {
    let dir = tempfile::tempdir().unwrap();
    let input = "\
timestamp,CH1_AmplMean_100,CH2_AmplMean_100
2024-01-01 00:00:00,0.10,1.50
2024-01-01 00:10:00,NaN,NA
";
    let output = run(config_for(dir.path(), input)).unwrap();

    assert_eq!(
        output,
        ",CH1_AmplMean_100,CH2_AmplMean_100,flag,rolling_mean\n\
         2024-01-01 00:00:00,0.10,1.50,0,0.0\n\
         2024-01-01 00:10:00,NaN,NA,0,0.0\n"
    );
}
