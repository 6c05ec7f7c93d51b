//! Per-ticker analysis output.

use crate::domain::PriceSeries;
use chrono::NaiveDate;
use std::sync::Arc;

/// Map a computed value to the explicit "undefined" convention.
///
/// NaN and ±∞ become `None`; every surfaced scalar goes through here.
pub fn defined(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Derived indicator series, aligned bar-for-bar with the source series.
///
/// Leading values are NaN until the indicator's window fills.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorHistory {
    pub daily_return: Vec<f64>,
    pub sma: Vec<f64>,
    pub upper_band: Vec<f64>,
    pub lower_band: Vec<f64>,
    pub bb_gap: Vec<f64>,
    pub rsi: Vec<f64>,
    pub true_range: Vec<f64>,
    pub atr: Vec<f64>,
    pub roc: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_histogram: Vec<f64>,
}

/// Everything the report compiler needs for one ticker.
///
/// Built once by the indicator engine and never modified. Dates and closes
/// are read from the shared source series rather than copied.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorResult {
    pub series: Arc<PriceSeries>,

    pub latest_price: f64,
    pub avg_daily_return: Option<f64>,
    pub volatility: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub upper_band: Option<f64>,
    pub lower_band: Option<f64>,
    pub avg_bb_gap: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,
    pub avg_roc: Option<f64>,
    pub latest_roc: Option<f64>,

    pub history: IndicatorHistory,
}

impl IndicatorResult {
    pub fn ticker(&self) -> &str {
        self.series.ticker()
    }

    pub fn bar_count(&self) -> usize {
        self.series.len()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.series.dates()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.series.closes()
    }
}
