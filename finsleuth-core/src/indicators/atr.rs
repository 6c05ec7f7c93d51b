//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! TR[0] = high[0] - low[0] (no previous close).
//! ATR is the simple rolling mean of TR over `period` bars.
//! Lookback: period - 1.

use super::sma::rolling_mean;
use crate::domain::PriceBar;
use crate::indicator::Indicator;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

/// Compute the True Range series from bars.
pub fn true_range(bars: &[PriceBar]) -> Vec<f64> {
    let n = bars.len();
    let mut tr = vec![f64::NAN; n];

    if n == 0 {
        return tr;
    }

    tr[0] = bars[0].high - bars[0].low;

    for i in 1..n {
        let h = bars[i].high;
        let l = bars[i].low;
        let pc = bars[i - 1].close;
        if h.is_nan() || l.is_nan() || pc.is_nan() {
            continue;
        }
        tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }

    tr
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        rolling_mean(&true_range(bars), self.period)
    }
}
