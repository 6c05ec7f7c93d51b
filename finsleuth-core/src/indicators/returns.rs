//! Daily simple returns.
//!
//! R[t] = (close[t] - close[t-1]) / close[t-1]
//! Lookback: 1 (R[0] is undefined).

use crate::domain::PriceBar;
use crate::indicator::{closes, Indicator};

#[derive(Debug, Clone)]
pub struct DailyReturn {
    name: String,
}

impl DailyReturn {
    pub fn new() -> Self {
        Self {
            name: "daily_return".to_string(),
        }
    }
}

impl Default for DailyReturn {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for DailyReturn {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        daily_returns(&closes(bars))
    }
}

/// Percentage change between consecutive values, NaN at index 0.
pub fn daily_returns(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    for i in 1..n {
        let prev = values[i - 1];
        let curr = values[i];
        if prev.is_nan() || curr.is_nan() || prev == 0.0 {
            continue;
        }
        result[i] = (curr - prev) / prev;
    }
    result
}
