//! Evidence gatherer: fetches price history and news for each ticker in turn.
//!
//! One ticker failing never stops the others. The run as a whole fails only
//! when not a single ticker produced a usable series.

use super::ingest;
use super::provider::{DataError, DataSource, GatherProgress, MarketDataProvider, NewsProvider};
use crate::domain::{NewsItem, PriceSeries};
use chrono::NaiveDate;
use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error;

/// Default news lookback in days.
pub const DEFAULT_NEWS_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Error)]
pub enum GatherError {
    #[error("no tickers to gather")]
    NoTickers,

    #[error("no data retrieved for any of {attempted} ticker(s)")]
    NoData { attempted: usize },
}

/// Everything gathered for one ticker.
#[derive(Debug, Clone)]
pub struct Evidence {
    pub series: Arc<PriceSeries>,
    pub news: Vec<NewsItem>,
    pub source: DataSource,
}

/// What to gather.
#[derive(Debug, Clone)]
pub struct GatherRequest {
    pub tickers: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub news_window_days: u32,
}

/// Gathered evidence keyed by ticker, in request order, plus the per-ticker failures.
#[derive(Debug, Default)]
pub struct EvidenceLocker {
    evidence: IndexMap<String, Evidence>,
    failures: Vec<(String, DataError)>,
}

impl EvidenceLocker {
    pub fn get(&self, ticker: &str) -> Option<&Evidence> {
        self.evidence.get(ticker)
    }

    pub fn len(&self) -> usize {
        self.evidence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evidence.is_empty()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.evidence.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Evidence)> {
        self.evidence.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn failures(&self) -> &[(String, DataError)] {
        &self.failures
    }
}

/// Gather evidence for every requested ticker, sequentially.
///
/// `news` is optional; offline providers have no headlines. A news failure is
/// logged and leaves that ticker with an empty news list.
pub fn gather_evidence(
    prices: &dyn MarketDataProvider,
    news: Option<&dyn NewsProvider>,
    request: &GatherRequest,
    progress: &dyn GatherProgress,
) -> Result<EvidenceLocker, GatherError> {
    let total = request.tickers.len();
    if total == 0 {
        return Err(GatherError::NoTickers);
    }

    let mut locker = EvidenceLocker::default();

    for (i, ticker) in request.tickers.iter().enumerate() {
        progress.on_start(ticker, i, total);

        match gather_single(prices, news, ticker, request) {
            Ok(evidence) => {
                progress.on_complete(ticker, i, total, &Ok(()));
                locker.evidence.insert(ticker.clone(), evidence);
            }
            Err(e) => {
                let outcome: Result<(), DataError> = Err(e);
                progress.on_complete(ticker, i, total, &outcome);
                if let Err(e) = outcome {
                    locker.failures.push((ticker.clone(), e));
                }
            }
        }

        // Fail the rest fast once the provider has blocked us
        if !prices.is_available() {
            for rest in &request.tickers[(i + 1)..] {
                tracing::error!(ticker = %rest, stage = "gather", "skipped: provider unavailable");
                locker
                    .failures
                    .push((rest.clone(), DataError::CircuitBreakerTripped));
            }
            break;
        }
    }

    progress.on_batch_complete(locker.len(), locker.failures.len(), total);

    if locker.is_empty() {
        return Err(GatherError::NoData { attempted: total });
    }
    Ok(locker)
}

/// Gather one ticker: fetch → ingest → news.
fn gather_single(
    prices: &dyn MarketDataProvider,
    news: Option<&dyn NewsProvider>,
    ticker: &str,
    request: &GatherRequest,
) -> Result<Evidence, DataError> {
    let fetched = prices.fetch(ticker, request.start, request.end)?;
    let ingested = ingest::ingest(ticker, fetched.bars)?;
    if ingested.dropped() > 0 {
        tracing::warn!(
            ticker,
            stage = "gather",
            void = ingested.void_dropped,
            duplicates = ingested.duplicates_dropped,
            invalid = ingested.insane_dropped,
            "dropped unusable bars"
        );
    }

    let news = match news {
        Some(provider) => match provider.fetch_news(ticker, request.news_window_days) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(ticker, stage = "gather", error = %e, "news unavailable");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    Ok(Evidence {
        series: Arc::new(ingested.series),
        news,
        source: fetched.source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::{FetchResult, RawBar};
    use chrono::{Duration, Utc};
    use std::sync::Mutex;

    struct FakePrices {
        failing: Vec<&'static str>,
    }

    impl MarketDataProvider for FakePrices {
        fn name(&self) -> &str {
            "fake"
        }

        fn fetch(
            &self,
            symbol: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<FetchResult, DataError> {
            if self.failing.contains(&symbol) {
                return Err(DataError::NetworkUnreachable("connection refused".into()));
            }
            let bars = (0..5)
                .map(|i| {
                    let close = 100.0 + i as f64;
                    RawBar {
                        date: start + Duration::days(i),
                        open: close,
                        high: close + 1.0,
                        low: close - 1.0,
                        close,
                        volume: 1_000,
                    }
                })
                .collect();
            Ok(FetchResult {
                symbol: symbol.to_string(),
                bars,
                source: DataSource::CsvImport,
            })
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    struct BrokenNews;

    impl NewsProvider for BrokenNews {
        fn fetch_news(&self, _symbol: &str, _window_days: u32) -> Result<Vec<NewsItem>, DataError> {
            Err(DataError::RateLimited {
                retry_after_secs: 60,
            })
        }
    }

    struct OneHeadline;

    impl NewsProvider for OneHeadline {
        fn fetch_news(&self, symbol: &str, _window_days: u32) -> Result<Vec<NewsItem>, DataError> {
            Ok(vec![NewsItem {
                title: format!("{symbol} beats estimates"),
                publisher: None,
                link: None,
                published_at: Utc::now(),
            }])
        }
    }

    #[derive(Default)]
    struct Recorder {
        batch: Mutex<Option<(usize, usize, usize)>>,
    }

    impl GatherProgress for Recorder {
        fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}

        fn on_complete(
            &self,
            _symbol: &str,
            _index: usize,
            _total: usize,
            _result: &Result<(), DataError>,
        ) {
        }

        fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
            *self.batch.lock().unwrap() = Some((succeeded, failed, total));
        }
    }

    fn request(tickers: &[&str]) -> GatherRequest {
        GatherRequest {
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            news_window_days: DEFAULT_NEWS_WINDOW_DAYS,
        }
    }

    #[test]
    fn one_failing_ticker_is_isolated() {
        let prices = FakePrices {
            failing: vec!["MSFT"],
        };
        let progress = Recorder::default();
        let locker = gather_evidence(
            &prices,
            None,
            &request(&["AAPL", "MSFT", "GOOG"]),
            &progress,
        )
        .unwrap();

        assert_eq!(locker.tickers().collect::<Vec<_>>(), vec!["AAPL", "GOOG"]);
        assert_eq!(locker.failures().len(), 1);
        assert_eq!(locker.failures()[0].0, "MSFT");
        assert_eq!(*progress.batch.lock().unwrap(), Some((2, 1, 3)));
    }

    #[test]
    fn all_failing_is_an_error() {
        let prices = FakePrices {
            failing: vec!["AAPL", "MSFT"],
        };
        let err = gather_evidence(&prices, None, &request(&["AAPL", "MSFT"]), &Recorder::default())
            .unwrap_err();
        assert!(matches!(err, GatherError::NoData { attempted: 2 }));
    }

    #[test]
    fn empty_request_is_an_error() {
        let prices = FakePrices { failing: vec![] };
        assert!(matches!(
            gather_evidence(&prices, None, &request(&[]), &Recorder::default()),
            Err(GatherError::NoTickers)
        ));
    }

    #[test]
    fn news_failure_keeps_the_ticker() {
        let prices = FakePrices { failing: vec![] };
        let locker =
            gather_evidence(&prices, Some(&BrokenNews), &request(&["AAPL"]), &Recorder::default())
                .unwrap();
        let evidence = locker.get("AAPL").unwrap();
        assert!(evidence.news.is_empty());
        assert_eq!(evidence.series.len(), 5);
    }

    #[test]
    fn news_is_attached_per_ticker() {
        let prices = FakePrices { failing: vec![] };
        let locker = gather_evidence(
            &prices,
            Some(&OneHeadline),
            &request(&["AAPL", "MSFT"]),
            &Recorder::default(),
        )
        .unwrap();
        assert_eq!(locker.get("MSFT").unwrap().news[0].title, "MSFT beats estimates");
    }
}
