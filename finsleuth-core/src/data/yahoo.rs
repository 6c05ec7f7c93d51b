//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API and recent headlines
//! from the v1 search API. Handles rate limiting, retries with exponential
//! backoff, response parsing, and the circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.
//! The CSV import path is the fallback when Yahoo is unavailable.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{
    DataError, DataSource, FetchResult, MarketDataProvider, NewsProvider, RawBar,
};
use crate::domain::NewsItem;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const CHART_BASE: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const SEARCH_BASE: &str = "https://query2.finance.yahoo.com/v1/finance/search";
const NEWS_COUNT: usize = 20;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Yahoo Finance v1 search API response (news only).
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<SearchNews>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNews {
    title: String,
    publisher: Option<String>,
    link: Option<String>,
    provider_publish_time: Option<i64>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Provider with its own default circuit breaker.
    pub fn with_default_breaker() -> Result<Self, DataError> {
        Self::new(Arc::new(CircuitBreaker::default_provider()))
    }

    /// Build the chart API URL for a symbol and inclusive date range.
    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Url, DataError> {
        let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end.and_time(NaiveTime::MIN).and_utc().timestamp() + 86_399;
        let mut url = Url::parse(CHART_BASE).map_err(|e| DataError::Other(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| DataError::Other(format!("{CHART_BASE} cannot take a path")))?
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("period1", &start_ts.to_string())
            .append_pair("period2", &end_ts.to_string())
            .append_pair("interval", "1d")
            .append_pair("includeAdjustedClose", "true");
        Ok(url)
    }

    fn news_url(symbol: &str) -> Result<Url, DataError> {
        Url::parse_with_params(
            SEARCH_BASE,
            &[
                ("q", symbol),
                ("quotesCount", "0"),
                ("newsCount", &NEWS_COUNT.to_string()),
            ],
        )
        .map_err(|e| DataError::Other(e.to_string()))
    }

    /// Parse the chart API response into RawBars.
    fn parse_chart(symbol: &str, resp: ChartResponse) -> Result<Vec<RawBar>, DataError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // A valid symbol with no trading days in range has no timestamps at all.
        let Some(timestamps) = data.timestamp else {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            // Holidays come back as all-null rows
            if open.is_none() && high.is_none() && low.is_none() && close.is_none() {
                continue;
            }

            bars.push(RawBar {
                date,
                open: open.unwrap_or(f64::NAN),
                high: high.unwrap_or(f64::NAN),
                low: low.unwrap_or(f64::NAN),
                close: close.unwrap_or(f64::NAN),
                volume: volume.unwrap_or(0),
            });
        }

        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }

        Ok(bars)
    }

    fn parse_news(resp: SearchResponse, now: DateTime<Utc>, window_days: u32) -> Vec<NewsItem> {
        resp.news
            .into_iter()
            .filter_map(|n| {
                let published_at = DateTime::from_timestamp(n.provider_publish_time?, 0)?;
                Some(NewsItem {
                    title: n.title,
                    publisher: n.publisher,
                    link: n.link,
                    published_at,
                })
            })
            .filter(|item| item.is_within(now, window_days))
            .collect()
    }

    /// GET a URL with retry and circuit breaker logic, returning the successful response.
    fn get_with_retry(
        &self,
        url: &str,
        symbol: &str,
    ) -> Result<reqwest::blocking::Response, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(ticker = symbol, attempt, ?delay, "retrying request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();

            if status == reqwest::StatusCode::FORBIDDEN {
                // IP ban: stop all further requests
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }

            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(DataError::AuthenticationRequired(
                    "Yahoo Finance requires authentication".into(),
                ));
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }

            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                continue;
            }

            self.circuit_breaker.record_success();
            return Ok(resp);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let url = Self::chart_url(symbol, start, end)?;
        let resp = self.get_with_retry(url.as_str(), symbol)?;
        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse chart for {symbol}: {e}"))
        })?;
        let bars = Self::parse_chart(symbol, chart)?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::YahooFinance,
        })
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

impl NewsProvider for YahooProvider {
    fn fetch_news(&self, symbol: &str, window_days: u32) -> Result<Vec<NewsItem>, DataError> {
        let url = Self::news_url(symbol)?;
        let resp = self.get_with_retry(url.as_str(), symbol)?;
        let search: SearchResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse news for {symbol}: {e}"))
        })?;
        Ok(Self::parse_news(search, Utc::now(), window_days))
    }
}
