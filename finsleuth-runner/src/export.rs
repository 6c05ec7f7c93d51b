//! Machine-readable exports alongside the case file.
//!
//! - **JSON**: one summary document for the whole set (scalars, bar count,
//!   date span, price source and any recent headlines gathered with the prices)
//! - **CSV**: full indicator history for one ticker, one row per bar

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use finsleuth_core::analysis::{AnalysisSet, IndicatorResult};
use finsleuth_core::data::{DataSource, Evidence, EvidenceLocker};
use finsleuth_core::domain::NewsItem;
use serde::Serialize;

pub const SUMMARY_FILE: &str = "financial_case_file_summary.json";

#[derive(Debug, Serialize)]
struct TickerSummary<'a> {
    ticker: &'a str,
    first_date: NaiveDate,
    last_date: NaiveDate,
    bars: usize,
    source: Option<DataSource>,
    latest_price: f64,
    avg_daily_return: Option<f64>,
    volatility: Option<f64>,
    sharpe_ratio: Option<f64>,
    macd: Option<f64>,
    macd_signal: Option<f64>,
    upper_band: Option<f64>,
    lower_band: Option<f64>,
    avg_bb_gap: Option<f64>,
    rsi: Option<f64>,
    atr: Option<f64>,
    avg_roc: Option<f64>,
    latest_roc: Option<f64>,
    news: &'a [NewsItem],
}

#[derive(Debug, Serialize)]
struct Summary<'a> {
    tickers: Vec<TickerSummary<'a>>,
}

fn summarize<'a>(
    ticker: &'a str,
    r: &'a IndicatorResult,
    evidence: Option<&'a Evidence>,
) -> TickerSummary<'a> {
    TickerSummary {
        ticker,
        first_date: r.series.first_date(),
        last_date: r.series.last_date(),
        bars: r.bar_count(),
        source: evidence.map(|e| e.source),
        latest_price: r.latest_price,
        avg_daily_return: r.avg_daily_return,
        volatility: r.volatility,
        sharpe_ratio: r.sharpe_ratio,
        macd: r.macd,
        macd_signal: r.macd_signal,
        upper_band: r.upper_band,
        lower_band: r.lower_band,
        avg_bb_gap: r.avg_bb_gap,
        rsi: r.rsi,
        atr: r.atr,
        avg_roc: r.avg_roc,
        latest_roc: r.latest_roc,
        news: evidence.map(|e| e.news.as_slice()).unwrap_or(&[]),
    }
}

/// Serialize the set to pretty JSON. Undefined scalars become `null`.
pub fn export_summary_json(set: &AnalysisSet, locker: Option<&EvidenceLocker>) -> Result<String> {
    let tickers = set
        .iter()
        .map(|(ticker, result)| summarize(ticker, result, locker.and_then(|l| l.get(ticker))))
        .collect();
    serde_json::to_string_pretty(&Summary { tickers })
        .context("failed to serialize analysis summary to JSON")
}

fn cell(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.6}")
    } else {
        String::new()
    }
}

fn value_at(values: &[f64], i: usize) -> String {
    cell(values.get(i).copied().unwrap_or(f64::NAN))
}

/// Export one ticker's indicator history as CSV. Warmup values are empty cells.
///
/// Columns: date, open, high, low, close, daily_return, sma, upper_band,
/// lower_band, bb_gap, rsi, true_range, atr, roc, macd, macd_signal,
/// macd_histogram
pub fn export_history_csv(result: &IndicatorResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date",
        "open",
        "high",
        "low",
        "close",
        "daily_return",
        "sma",
        "upper_band",
        "lower_band",
        "bb_gap",
        "rsi",
        "true_range",
        "atr",
        "roc",
        "macd",
        "macd_signal",
        "macd_histogram",
    ])?;

    let h = &result.history;
    for (i, bar) in result.series.bars().iter().enumerate() {
        wtr.write_record([
            bar.date.to_string(),
            cell(bar.open),
            cell(bar.high),
            cell(bar.low),
            cell(bar.close),
            value_at(&h.daily_return, i),
            value_at(&h.sma, i),
            value_at(&h.upper_band, i),
            value_at(&h.lower_band, i),
            value_at(&h.bb_gap, i),
            value_at(&h.rsi, i),
            value_at(&h.true_range, i),
            value_at(&h.atr, i),
            value_at(&h.roc, i),
            value_at(&h.macd, i),
            value_at(&h.macd_signal, i),
            value_at(&h.macd_histogram, i),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Which exports to write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub json: bool,
    pub csv: bool,
}

impl ExportOptions {
    pub fn any(self) -> bool {
        self.json || self.csv
    }
}

/// Write the requested exports into `dir`; returns the paths written.
pub fn write_exports(
    set: &AnalysisSet,
    locker: Option<&EvidenceLocker>,
    dir: &Path,
    options: ExportOptions,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if !options.any() {
        return Ok(written);
    }
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    if options.json {
        let path = dir.join(SUMMARY_FILE);
        let json = export_summary_json(set, locker)?;
        fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    if options.csv {
        for (ticker, result) in set.iter() {
            let path = dir.join(format!("{ticker}_indicators.csv"));
            let csv = export_history_csv(result)
                .with_context(|| format!("failed to export {ticker} history"))?;
            fs::write(&path, csv).with_context(|| format!("failed to write {}", path.display()))?;
            written.push(path);
        }
    }
    tracing::info!(stage = "export", files = written.len(), "exports written");
    Ok(written)
}
