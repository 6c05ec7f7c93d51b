//! FinSleuth CLI: gather evidence, analyze it and compile the case file.
//!
//! Reads a TOML config (default `config.toml`); flags override its values.
//! Exits 0 when the case file was written, 1 otherwise.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{prelude::*, EnvFilter};

use finsleuth_runner::config::parse_optional_date;
use finsleuth_runner::{
    investigate, ConfigOverrides, ExportOptions, ReportFormat, RunConfig, RunOptions,
};

#[derive(Parser, Debug)]
#[command(
    name = "finsleuth",
    version,
    about = "Financial detective: technical-indicator case files for a list of tickers"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Report format, overriding the config (pdf or txt).
    #[arg(long, value_parser = parse_format)]
    format: Option<ReportFormat>,

    /// Start date (YYYY-MM-DD), overriding the config.
    #[arg(long, value_parser = parse_start)]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD), overriding the config.
    #[arg(long, value_parser = parse_end)]
    end: Option<NaiveDate>,

    /// Directory for the case file and exports.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Read prices from <DIR>/<TICKER>.csv instead of Yahoo Finance.
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Also write a JSON summary of the analysis.
    #[arg(long, default_value_t = false)]
    export_json: bool,

    /// Also write one CSV of indicator history per ticker.
    #[arg(long, default_value_t = false)]
    export_csv: bool,

    /// Append logs to this file in addition to stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            report_format: self.format,
            start_date: self.start,
            end_date: self.end,
            output_dir: self.output_dir.clone(),
            csv_dir: self.csv_dir.clone(),
        }
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            exports: ExportOptions {
                json: self.export_json,
                csv: self.export_csv,
            },
        }
    }
}

fn parse_format(s: &str) -> Result<ReportFormat, String> {
    s.parse::<ReportFormat>().map_err(|e| e.to_string())
}

fn parse_date(key: &'static str, s: &str) -> Result<NaiveDate, String> {
    parse_optional_date(key, Some(s))
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("{key} must not be empty"))
}

fn parse_start(s: &str) -> Result<NaiveDate, String> {
    parse_date("start_date", s)
}

fn parse_end(s: &str) -> Result<NaiveDate, String> {
    parse_date("end_date", s)
}

/// Install the global subscriber. The returned guard flushes the log file
/// when dropped, so it must be held until the run is over.
fn init_tracing(log_file: Option<PathBuf>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Both fmt layers share the span field cache, so colors on stderr would
    // leak escape codes into the file.
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_ansi(log_file.is_none())
        .with_writer(std::io::stderr);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|err| anyhow!("failed to create log directory {parent:?}: {err}"))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| anyhow!("failed to open log file {path:?}: {err}"))?;
        let (writer, guard) = non_blocking(file);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer);
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .try_init()
            .map_err(|err| anyhow!("failed to initialize tracing: {err}"))?;
        Ok(Some(guard))
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()
            .map_err(|err| anyhow!("failed to initialize tracing: {err}"))?;
        Ok(None)
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let config = RunConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?
        .with_overrides(cli.overrides())
        .context("invalid command-line override")?;

    tracing::info!(
        stage = "config",
        tickers = ?config.stocks,
        start = %config.start_date,
        end = %config.end_date,
        format = %config.report_format,
        output_dir = %config.output_dir.display(),
        "opening investigation"
    );
    Ok(investigate(&config, cli.run_options()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_tracing(cli.log_file.clone()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "run aborted");
            ExitCode::FAILURE
        }
    }
}
