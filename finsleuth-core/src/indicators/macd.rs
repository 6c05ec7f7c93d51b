//! Moving Average Convergence Divergence (MACD).
//!
//! MACD = EMA(close, fast) - EMA(close, slow)
//! Signal = EMA(MACD, signal)
//! Histogram = MACD - Signal
//! All EMAs are seeded with their first input, so every series is defined from bar 0.

use super::ema::ema_of_series;
use crate::domain::PriceBar;
use crate::indicator::{closes, Indicator};

/// Which MACD line to expose through the `Indicator` trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        assert!(fast >= 1 && slow >= 1 && signal >= 1, "MACD spans must be >= 1");
        assert!(fast < slow, "MACD fast span must be shorter than slow span");
        let label = match line {
            MacdLine::Macd => "line",
            MacdLine::Signal => "signal",
            MacdLine::Histogram => "hist",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("macd_{label}_{fast}_{slow}_{signal}"),
        }
    }

    /// The conventional 12/26/9 configuration.
    pub fn standard(line: MacdLine) -> Self {
        Self::new(12, 26, 9, line)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let series = macd_of_series(&closes(bars), self.fast, self.slow, self.signal);
        match self.line {
            MacdLine::Macd => series.macd,
            MacdLine::Signal => series.signal,
            MacdLine::Histogram => series.histogram,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd_of_series(values: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let fast_ema = ema_of_series(values, fast);
    let slow_ema = ema_of_series(values, slow);
    let macd: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = ema_of_series(&macd, signal);
    let histogram = macd.iter().zip(&signal_line).map(|(m, s)| m - s).collect();

    MacdSeries {
        macd,
        signal: signal_line,
        histogram,
    }
}
