//! Exceedance CLI
//!
//! With no arguments, reads `./data_sample.csv` and writes `./result.csv`.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use exceedance::{parse_window, Config, Pipeline, VERSION};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "exceedance")]
#[command(version = VERSION)]
#[command(about = "Flag threshold exceedances in timestamped CSV data", long_about = None)]
struct Cli {
    /// JSON configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline (the default when no command is given)
    Run(RunArgs),

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// Input CSV file
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Output CSV file
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Flag values strictly above this threshold
    #[arg(long)]
    threshold: Option<f64>,

    /// Trailing window width, e.g. 60min, 10S, 500L
    #[arg(long, value_parser = parse_window)]
    window: Option<chrono::Duration>,

    /// Column compared against the threshold
    #[arg(long)]
    column: Option<String>,

    /// Input encoding label, e.g. sjis
    #[arg(long)]
    encoding: Option<String>,

    /// Minimum observations per window
    #[arg(long)]
    min_periods: Option<usize>,

    /// Save the run report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

impl RunArgs {
    fn apply(self, config: &mut Config) {
        if let Some(input) = self.input {
            config.input_path = input;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(window) = self.window {
            config.window = window;
        }
        if let Some(column) = self.column {
            config.amplitude_column = column;
        }
        if let Some(encoding) = self.encoding {
            config.encoding = Some(encoding);
        }
        if let Some(min_periods) = self.min_periods {
            config.min_periods = min_periods;
        }
        if let Some(report) = self.report {
            config.report_path = Some(report);
        }
    }
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Run(RunArgs::default()));

    let result = match command {
        Commands::Run(args) => cmd_run(cli.config.as_deref(), args),
        Commands::Config { save } => cmd_config(cli.config.as_deref(), save),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

fn cmd_run(config_path: Option<&Path>, args: RunArgs) -> anyhow::Result<()> {
    let mut config = Config::load(config_path).context("Failed to load configuration")?;
    args.apply(&mut config);

    let pipeline = Pipeline::new(config).context("Invalid configuration")?;
    let config = pipeline.config();

    let report = pipeline.run().with_context(|| {
        format!(
            "Failed to process {} into {}",
            config.input_path.display(),
            config.output_path.display()
        )
    })?;

    println!("{}", report.summary());
    Ok(())
}

fn cmd_config(config_path: Option<&Path>, save: bool) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    let path = config_path.map_or_else(Config::config_path, Path::to_path_buf);

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {path:?}");
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);

    if save {
        config
            .save(&path)
            .with_context(|| format!("Failed to save configuration to {}", path.display()))?;
        println!();
        println!("Saved configuration to {path:?}");
    }
    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
