//! Simple Moving Average (SMA) and rolling sample standard deviation.
//!
//! A window containing NaN yields NaN.
//! Lookback: period - 1 (first valid value at index period-1).

use super::stats::sample_std;
use crate::domain::PriceBar;
use crate::indicator::{closes, Indicator};

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        rolling_mean(&closes(bars), self.period)
    }
}

/// Apply `f` to every full, NaN-free window of `period` values.
///
/// Each window is summed from scratch; a constant series yields exact values
/// instead of accumulated add/subtract residue.
fn rolling<F>(values: &[f64], period: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = f(window);
    }

    result
}

/// Rolling arithmetic mean over `period` values.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Rolling sample standard deviation (ddof = 1) over `period` values.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, sample_std)
}
