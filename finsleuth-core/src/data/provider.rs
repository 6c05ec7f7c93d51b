//! Data provider traits and structured error types.
//!
//! The provider traits abstract over data sources (Yahoo Finance, CSV import)
//! so implementations can be swapped, and mocked in tests.

use crate::domain::{NewsItem, SeriesError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw daily OHLCV bar from a data provider (before validation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Structured error types for data operations.
///
/// Each variant is logged against the ticker it occurred for; none of them
/// aborts a multi-ticker run on its own.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no data available for {symbol} in the requested range")]
    NoData { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("csv import error: {0}")]
    Csv(String),

    #[error("invalid price series: {0}")]
    InvalidSeries(#[from] SeriesError),

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<RawBar>,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
}

/// Trait for price history providers (Yahoo Finance, CSV import, etc).
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily OHLCV bars for a symbol over an inclusive date range.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool;
}

/// Trait for news providers.
pub trait NewsProvider: Send + Sync {
    /// Fetch news published within the last `window_days` days.
    fn fetch_news(&self, symbol: &str, window_days: u32) -> Result<Vec<NewsItem>, DataError>;
}

/// Progress callback for multi-symbol gathering.
pub trait GatherProgress: Send {
    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol fetch completes.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: &Result<(), DataError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that emits structured log events.
pub struct TracingProgress;

impl GatherProgress for TracingProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        tracing::info!(
            ticker = symbol,
            stage = "gather",
            "[{}/{}] investigating {symbol}",
            index + 1,
            total
        );
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: &Result<(), DataError>,
    ) {
        match result {
            Ok(()) => tracing::info!(ticker = symbol, stage = "gather", "evidence stored"),
            Err(e) => tracing::error!(ticker = symbol, stage = "gather", error = %e, "fetch failed"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        tracing::info!(
            stage = "gather",
            succeeded,
            failed,
            total,
            "evidence gathering complete"
        );
    }
}
