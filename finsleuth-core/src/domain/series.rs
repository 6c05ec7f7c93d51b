//! PriceSeries: the validated, immutable price history of one ticker.

use super::bar::PriceBar;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("price series for '{ticker}' is empty")]
    Empty { ticker: String },

    #[error("price series for '{ticker}' is not strictly increasing at {date}")]
    NonIncreasingDates { ticker: String, date: NaiveDate },
}

/// Time-ordered bars for one ticker.
///
/// Dates are strictly increasing. Once built the series is never mutated;
/// downstream stages share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        let ticker = ticker.into();
        if bars.is_empty() {
            return Err(SeriesError::Empty { ticker });
        }
        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(SeriesError::NonIncreasingDates {
                ticker,
                date: pair[1].date,
            });
        }
        Ok(Self { ticker, bars })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
