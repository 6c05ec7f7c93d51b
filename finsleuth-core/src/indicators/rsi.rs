//! Relative Strength Index (RSI), simple-average form.
//!
//! delta[t] = close[t] - close[t-1], with delta[0] counted as 0.
//! avg_gain / avg_loss are rolling means over `period` deltas (not Wilder smoothing).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period - 1.
//! Edge cases: avg_loss == 0 with gains → 100; no movement at all → NaN (undefined).

use super::sma::rolling_mean;
use crate::domain::PriceBar;
use crate::indicator::{closes, Indicator};

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        rsi_of_series(&closes(bars), self.period)
    }
}

/// RSI from a pre-extracted close series.
pub fn rsi_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];

    for i in 1..n {
        let change = values[i] - values[i - 1];
        if change.is_nan() {
            gains[i] = f64::NAN;
            losses[i] = f64::NAN;
        } else if change > 0.0 {
            gains[i] = change;
        } else if change < 0.0 {
            losses[i] = -change;
        }
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| compute_rsi(g, l))
        .collect()
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        f64::NAN
    } else if avg_loss == 0.0 && avg_gain == 0.0 {
        f64::NAN
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
