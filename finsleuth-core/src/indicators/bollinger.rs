//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//! - Gap: upper - lower
//!
//! Uses sample stddev (divide by N - 1).
//! Lookback: period - 1.

use super::sma::{rolling_mean, rolling_std};
use crate::domain::PriceBar;
use crate::indicator::{closes, Indicator};

/// Which Bollinger series to expose through the `Indicator` trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
    Gap,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        let label = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
            BollingerBand::Gap => "gap",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("bollinger_{label}_{period}_{multiplier}"),
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Upper)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Middle)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Lower)
    }

    pub fn gap(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Gap)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let bands = bollinger_bands(&closes(bars), self.period, self.multiplier);
        match self.band {
            BollingerBand::Upper => bands.upper,
            BollingerBand::Middle => bands.middle,
            BollingerBand::Lower => bands.lower,
            BollingerBand::Gap => bands.gap,
        }
    }
}

/// All Bollinger series for one input, computed together.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    pub gap: Vec<f64>,
}

pub fn bollinger_bands(values: &[f64], period: usize, multiplier: f64) -> BollingerSeries {
    let middle = rolling_mean(values, period);
    let std = rolling_std(values, period);

    let upper: Vec<f64> = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| m + multiplier * s)
        .collect();
    let lower: Vec<f64> = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| m - multiplier * s)
        .collect();
    let gap = upper.iter().zip(&lower).map(|(u, l)| u - l).collect();

    BollingerSeries {
        middle,
        upper,
        lower,
        gap,
    }
}
