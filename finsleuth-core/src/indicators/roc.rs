//! Rate of Change (ROC).
//!
//! Percentage price change over N bars.
//! ROC[t] = (close[t] - close[t-period]) / close[t-period] * 100
//! Lookback: period.

use crate::domain::PriceBar;
use crate::indicator::{closes, Indicator};

#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
    name: String,
}

impl Roc {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ROC period must be >= 1");
        Self {
            period,
            name: format!("roc_{period}"),
        }
    }
}

impl Indicator for Roc {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        roc_of_series(&closes(bars), self.period)
    }
}

pub fn roc_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    for i in period..n {
        let prev = values[i - period];
        let curr = values[i];
        if prev.is_nan() || curr.is_nan() || prev == 0.0 {
            continue;
        }
        result[i] = (curr - prev) / prev * 100.0;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn roc_basic() {
        let bars = make_bars(&[100.0, 110.0, 121.0]);
        let result = Roc::new(1).compute(&bars);

        assert!(result[0].is_nan());
        assert_approx(result[1], 10.0, DEFAULT_EPSILON);
        assert_approx(result[2], 10.0, DEFAULT_EPSILON);
    }

    #[test]
    fn roc_period_2() {
        let result = roc_of_series(&[100.0, 110.0, 121.0], 2);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 21.0, DEFAULT_EPSILON);
    }

    #[test]
    fn roc_negative() {
        let result = roc_of_series(&[100.0, 90.0], 1);
        assert_approx(result[1], -10.0, DEFAULT_EPSILON);
    }

    #[test]
    fn roc_is_exactly_zero_on_repeat() {
        let mut closes: Vec<f64> = (0..13).map(|i| 100.0 + (i as f64).sin() * 5.0).collect();
        closes[12] = closes[0];
        let result = roc_of_series(&closes, 12);
        assert_eq!(result[12], 0.0);
    }

    #[test]
    fn roc_nan_propagation() {
        let result = roc_of_series(&[100.0, f64::NAN, 120.0], 1);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
    }

    #[test]
    fn roc_lookback() {
        assert_eq!(Roc::new(12).lookback(), 12);
    }
}
