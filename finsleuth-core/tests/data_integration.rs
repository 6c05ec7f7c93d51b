//! Integration tests for the data pipeline: CSV files → gatherer → engine.

use chrono::NaiveDate;
use finsleuth_core::analysis::{analyze, AnalysisSet};
use finsleuth_core::data::{
    gather_evidence, CsvProvider, DataError, GatherError, GatherRequest, TracingProgress,
};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Write `n` consecutive daily bars rising by one dollar a day.
fn write_fixture(dir: &Path, ticker: &str, n: usize) {
    let mut csv = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    let base = date(2024, 1, 1);
    for i in 0..n {
        let close = 100.0 + i as f64;
        let day = base + chrono::Duration::days(i as i64);
        writeln!(
            csv,
            "{day},{:.2},{:.2},{:.2},{close:.2},{close:.2},{}",
            close - 0.5,
            close + 1.0,
            close - 1.0,
            1_000_000 + i
        )
        .unwrap();
    }
    std::fs::write(dir.join(format!("{ticker}.csv")), csv).unwrap();
}

fn request(tickers: &[&str]) -> GatherRequest {
    GatherRequest {
        tickers: tickers.iter().map(|t| t.to_string()).collect(),
        start: date(2024, 1, 1),
        end: date(2024, 12, 31),
        news_window_days: 30,
    }
}

#[test]
fn one_missing_ticker_does_not_sink_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "AAPL", 40);
    write_fixture(dir.path(), "GOOG", 40);
    let provider = CsvProvider::new(dir.path());

    let locker = gather_evidence(
        &provider,
        None,
        &request(&["AAPL", "MSFT", "GOOG"]),
        &TracingProgress,
    )
    .unwrap();

    assert_eq!(locker.len(), 2);
    assert!(matches!(
        locker.failures()[0].1,
        DataError::SymbolNotFound { .. }
    ));

    let set: AnalysisSet = locker
        .iter()
        .map(|(_, ev)| analyze(Arc::clone(&ev.series)).unwrap())
        .collect();
    assert_eq!(set.tickers().collect::<Vec<_>>(), vec!["AAPL", "GOOG"]);
    assert!(!set.contains("MSFT"));
}

#[test]
fn thirty_day_uptrend_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "UP", 30);
    let provider = CsvProvider::new(dir.path());

    let locker = gather_evidence(&provider, None, &request(&["UP"]), &TracingProgress).unwrap();
    let evidence = locker.get("UP").unwrap();
    assert_eq!(evidence.series.len(), 30);
    assert!(evidence.news.is_empty());

    let result = analyze(Arc::clone(&evidence.series)).unwrap();
    assert_eq!(result.latest_price, 129.0);
    assert!(result.avg_daily_return.unwrap() > 0.0);
    assert!(result.volatility.unwrap() > 0.0);
    assert!(result.rsi.unwrap() > 70.0);
    assert!(result.macd.unwrap() > 0.0);
}

#[test]
fn date_range_limits_the_series() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "AAPL", 60);
    let provider = CsvProvider::new(dir.path());

    let req = GatherRequest {
        start: date(2024, 1, 11),
        end: date(2024, 1, 20),
        ..request(&["AAPL"])
    };
    let locker = gather_evidence(&provider, None, &req, &TracingProgress).unwrap();
    let series = &locker.get("AAPL").unwrap().series;
    assert_eq!(series.len(), 10);
    assert_eq!(series.first_date(), date(2024, 1, 11));
    assert_eq!(series.last_date(), date(2024, 1, 20));
}

#[test]
fn nothing_found_is_a_gather_error() {
    let dir = tempfile::tempdir().unwrap();
    let provider = CsvProvider::new(dir.path());
    let err = gather_evidence(&provider, None, &request(&["A", "B"]), &TracingProgress).unwrap_err();
    assert!(matches!(err, GatherError::NoData { attempted: 2 }));
}
