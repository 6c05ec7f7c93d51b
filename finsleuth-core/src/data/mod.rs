//! Market data: providers, ingest and evidence gathering.

pub mod circuit_breaker;
pub mod csv_import;
pub mod gather;
pub mod ingest;
pub mod provider;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvProvider;
pub use gather::{
    gather_evidence, Evidence, EvidenceLocker, GatherError, GatherRequest,
    DEFAULT_NEWS_WINDOW_DAYS,
};
pub use ingest::{ingest, IngestResult};
pub use provider::{
    DataError, DataSource, FetchResult, GatherProgress, MarketDataProvider, NewsProvider, RawBar,
    TracingProgress,
};
pub use yahoo::YahooProvider;
