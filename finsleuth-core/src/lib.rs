//! FinSleuth Core: domain types, indicator engine, market data providers.
//!
//! - Domain types (price bars, validated price series, news items)
//! - Indicators over bar slices, with NaN warmup
//! - The indicator engine that turns one series into one `IndicatorResult`
//! - Providers (Yahoo Finance, CSV import) and the sequential evidence gatherer

pub mod analysis;
pub mod data;
pub mod domain;
pub mod indicator;
pub mod indicators;
