//! Indicator trait.
//!
//! Indicators are pure functions: bar history in, numeric series out.
//! Each is computed once per ticker per run; nothing is recomputed bar by bar.

use crate::domain::PriceBar;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. The first `lookback()` values are `f64::NAN` (warmup).
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a `Vec<f64>` of the same length as `bars`.
    fn compute(&self, bars: &[PriceBar]) -> Vec<f64>;
}

/// Extract the close column from a bar slice.
pub(crate) fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
