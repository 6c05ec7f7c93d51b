//! End-to-end investigation: wires together gathering, analysis and reporting.
//!
//! Two entry points:
//! - `run_investigation()`: builds providers from the config, then runs. Used by the CLI.
//! - `run_with_providers()`: takes providers directly. Used by tests and offline runs.
//!
//! `investigate()` wraps the first and reduces the outcome to a success flag.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use finsleuth_core::analysis::IndicatorEngine;
use finsleuth_core::data::{
    gather_evidence, CsvProvider, DataError, GatherError, GatherRequest, MarketDataProvider,
    NewsProvider, TracingProgress, YahooProvider,
};

use crate::analyze::analyze_evidence;
use crate::config::RunConfig;
use crate::export::{write_exports, ExportOptions};
use crate::reporting::{cleanup_temp_files, compile_case_file, ReportError, ReportOutput};

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("provider setup failed: {0}")]
    Provider(#[from] DataError),
    #[error("gather failed: {0}")]
    Gather(#[from] GatherError),
    #[error("no ticker could be analyzed")]
    NothingAnalyzed,
    #[error("report failed: {0}")]
    Report(#[from] ReportError),
    #[error("export failed: {0:#}")]
    Export(anyhow::Error),
}

/// Extras requested alongside the case file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub exports: ExportOptions,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: ReportOutput,
    /// Tickers in the case file, in configured order.
    pub analyzed: Vec<String>,
    /// Configured tickers that were dropped along the way.
    pub excluded: Vec<String>,
    pub exports: Vec<PathBuf>,
}

type Providers = (Arc<dyn MarketDataProvider>, Option<Arc<dyn NewsProvider>>);

/// CSV directory when configured, otherwise Yahoo Finance for prices and news.
pub fn build_providers(config: &RunConfig) -> Result<Providers, DataError> {
    match &config.csv_dir {
        Some(dir) => {
            tracing::info!(stage = "gather", dir = %dir.display(), "using CSV price files");
            let prices: Arc<dyn MarketDataProvider> = Arc::new(CsvProvider::new(dir.clone()));
            Ok((prices, None))
        }
        None => {
            let yahoo = Arc::new(YahooProvider::with_default_breaker()?);
            let news: Arc<dyn NewsProvider> = yahoo.clone();
            let prices: Arc<dyn MarketDataProvider> = yahoo;
            Ok((prices, Some(news)))
        }
    }
}

/// Run the full pipeline with providers chosen from the config.
pub fn run_investigation(config: &RunConfig, options: RunOptions) -> Result<RunSummary, RunError> {
    let (prices, news) = build_providers(config)?;
    run_with_providers(config, prices.as_ref(), news.as_deref(), options)
}

/// Run the full pipeline against the given providers.
pub fn run_with_providers(
    config: &RunConfig,
    prices: &dyn MarketDataProvider,
    news: Option<&dyn NewsProvider>,
    options: RunOptions,
) -> Result<RunSummary, RunError> {
    let locker = {
        let _span = tracing::info_span!("gather", provider = prices.name()).entered();
        let request = GatherRequest {
            tickers: config.stocks.clone(),
            start: config.start_date,
            end: config.end_date,
            news_window_days: config.news_window_days,
        };
        gather_evidence(prices, news, &request, &TracingProgress)?
    };

    let set = {
        let _span = tracing::info_span!("analyze", tickers = locker.len()).entered();
        analyze_evidence(&IndicatorEngine::default(), &locker)
    };
    if set.is_empty() {
        tracing::error!(stage = "analyze", "no ticker survived analysis");
        return Err(RunError::NothingAnalyzed);
    }

    let report = {
        let _span = tracing::info_span!("report", format = %config.report_format).entered();
        let output = compile_case_file(&set, config.report_format, &config.output_dir)?;
        output.verify()?;
        output
    };

    {
        let _span = tracing::info_span!("cleanup", files = report.temp_files.len()).entered();
        cleanup_temp_files(&report.temp_files);
    }

    let exports = write_exports(&set, Some(&locker), &config.output_dir, options.exports)
        .map_err(RunError::Export)?;

    let analyzed: Vec<String> = set.tickers().map(str::to_string).collect();
    let excluded = config
        .stocks
        .iter()
        .filter(|t| !set.contains(t))
        .cloned()
        .collect();

    Ok(RunSummary {
        report,
        analyzed,
        excluded,
        exports,
    })
}

/// Run the pipeline and log the outcome. Returns `true` on success.
pub fn investigate(config: &RunConfig, options: RunOptions) -> bool {
    match run_investigation(config, options) {
        Ok(summary) => {
            if !summary.excluded.is_empty() {
                tracing::warn!(excluded = ?summary.excluded, "some tickers were left out of the case file");
            }
            tracing::info!(
                tickers = summary.analyzed.len(),
                path = %summary.report.output_file.display(),
                "case closed"
            );
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "investigation failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportFormat;
    use chrono::NaiveDate;

    fn config(dir: &std::path::Path, csv_dir: Option<PathBuf>) -> RunConfig {
        RunConfig {
            stocks: vec!["AAPL".into()],
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            report_format: ReportFormat::Txt,
            output_dir: dir.to_path_buf(),
            news_window_days: 30,
            csv_dir,
        }
    }

    #[test]
    fn csv_dir_selects_offline_provider_without_news() {
        let dir = tempfile::tempdir().unwrap();
        let (prices, news) = build_providers(&config(dir.path(), Some(dir.path().into()))).unwrap();
        assert_eq!(prices.name(), "csv_import");
        assert!(news.is_none());
    }

    #[test]
    fn missing_data_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), Some(dir.path().join("empty")));
        assert!(!investigate(&cfg, RunOptions::default()));
        assert!(matches!(
            run_investigation(&cfg, RunOptions::default()),
            Err(RunError::Gather(GatherError::NoData { attempted: 1 }))
        ));
    }
}
