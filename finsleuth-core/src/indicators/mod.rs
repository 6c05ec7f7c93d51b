//! Concrete indicator implementations.
//!
//! Every indicator implements the `Indicator` trait from `crate::indicator`
//! and also exposes a slice-level function (`*_of_series`, `rolling_*`) that
//! the analysis engine calls directly on the extracted close column.
//!
//! Multi-series indicators (Bollinger, MACD) are exposed as separate named
//! instances per line, keeping the single-series `Indicator` trait unchanged.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod returns;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod stats;

pub use atr::{true_range, Atr};
pub use bollinger::{bollinger_bands, Bollinger, BollingerBand, BollingerSeries};
pub use ema::{ema_alpha, ema_of_series, Ema};
pub use macd::{macd_of_series, Macd, MacdLine, MacdSeries};
pub use returns::{daily_returns, DailyReturn};
pub use roc::{roc_of_series, Roc};
pub use rsi::{rsi_of_series, Rsi};
pub use sma::{rolling_mean, rolling_std, Sma};

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::PriceBar> {
    use crate::domain::PriceBar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Create bars from explicit (open, high, low, close) tuples.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::PriceBar> {
    use crate::domain::PriceBar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| PriceBar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
