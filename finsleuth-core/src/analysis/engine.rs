//! Indicator engine: one price series in, one `IndicatorResult` out.
//!
//! Pure and deterministic. The engine never touches the network or disk and
//! keeps no state between calls, so tickers can be analyzed on any thread in
//! any order.

use super::result::{defined, IndicatorHistory, IndicatorResult};
use crate::domain::PriceSeries;
use crate::indicators::{
    bollinger_bands, daily_returns, macd_of_series, roc_of_series, rolling_mean, rsi_of_series,
    stats, true_range,
};
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

/// Minimum bars needed to form at least one daily return.
pub const MIN_BARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("'{ticker}' has {bars} bar(s); at least {required} are needed")]
    InsufficientHistory {
        ticker: String,
        bars: usize,
        required: usize,
    },

    #[error("'{ticker}' has an invalid close of {close} on {date}")]
    InvalidClose {
        ticker: String,
        date: NaiveDate,
        close: f64,
    },
}

/// Window and span settings for every indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisParams {
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
    pub rsi_period: usize,
    pub atr_period: usize,
    pub roc_period: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_multiplier: 2.0,
            rsi_period: 14,
            atr_period: 14,
            roc_period: 12,
        }
    }
}

impl AnalysisParams {
    /// The longest lookback any indicator uses.
    pub fn max_window(&self) -> usize {
        self.macd_slow
            .max(self.bollinger_period)
            .max(self.rsi_period)
            .max(self.atr_period)
            .max(self.roc_period + 1)
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    params: AnalysisParams,
}

impl IndicatorEngine {
    pub fn new(params: AnalysisParams) -> Self {
        Self { params }
    }

    /// Compute every indicator for one ticker.
    pub fn analyze(&self, series: Arc<PriceSeries>) -> Result<IndicatorResult, AnalysisError> {
        let p = &self.params;
        let ticker = series.ticker().to_string();

        if series.len() < MIN_BARS {
            return Err(AnalysisError::InsufficientHistory {
                ticker,
                bars: series.len(),
                required: MIN_BARS,
            });
        }
        if let Some(bad) = series
            .bars()
            .iter()
            .find(|b| !b.close.is_finite() || b.close <= 0.0)
        {
            return Err(AnalysisError::InvalidClose {
                ticker,
                date: bad.date,
                close: bad.close,
            });
        }
        if series.len() < p.max_window() {
            tracing::warn!(
                ticker = %ticker,
                stage = "analyze",
                bars = series.len(),
                needed = p.max_window(),
                "series shorter than the longest indicator window; some values will be undefined"
            );
        }

        let closes = series.closes();
        let n = closes.len();

        let daily_return = daily_returns(&closes);
        let avg_daily_return = stats::mean_defined(&daily_return);
        let volatility = stats::sample_std_defined(&daily_return);
        let sharpe_ratio = sharpe(avg_daily_return, volatility, n);

        let macd = macd_of_series(&closes, p.macd_fast, p.macd_slow, p.macd_signal);
        let bands = bollinger_bands(&closes, p.bollinger_period, p.bollinger_multiplier);
        let rsi = rsi_of_series(&closes, p.rsi_period);
        let tr = true_range(series.bars());
        let atr = rolling_mean(&tr, p.atr_period);
        let roc = roc_of_series(&closes, p.roc_period);

        Ok(IndicatorResult {
            latest_price: closes[n - 1],
            avg_daily_return: defined(avg_daily_return),
            volatility: defined(volatility),
            sharpe_ratio,
            macd: defined(stats::last(&macd.macd)),
            macd_signal: defined(stats::last(&macd.signal)),
            upper_band: defined(stats::last(&bands.upper)),
            lower_band: defined(stats::last(&bands.lower)),
            avg_bb_gap: defined(stats::mean_defined(&bands.gap)),
            rsi: defined(stats::last(&rsi)),
            atr: defined(stats::last(&atr)),
            avg_roc: defined(stats::mean_defined(&roc)),
            latest_roc: defined(stats::last(&roc)),
            history: IndicatorHistory {
                daily_return,
                sma: bands.middle,
                upper_band: bands.upper,
                lower_band: bands.lower,
                bb_gap: bands.gap,
                rsi,
                true_range: tr,
                atr,
                roc,
                macd: macd.macd,
                macd_signal: macd.signal,
                macd_histogram: macd.histogram,
            },
            series,
        })
    }
}

/// Sharpe ratio with a zero risk-free rate, annualized by the sample's own bar count.
///
/// Undefined when volatility is zero or undefined.
pub fn sharpe(avg_return: f64, volatility: f64, bars: usize) -> Option<f64> {
    if !volatility.is_finite() || volatility == 0.0 {
        return None;
    }
    defined(avg_return / volatility * (bars as f64).sqrt())
}

/// Analyze with the default parameters.
pub fn analyze(series: Arc<PriceSeries>) -> Result<IndicatorResult, AnalysisError> {
    IndicatorEngine::default().analyze(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceBar;
    use crate::indicators::{assert_approx, make_bars};

    fn series_from(closes: &[f64]) -> Arc<PriceSeries> {
        Arc::new(PriceSeries::new("TEST", make_bars(closes)).unwrap())
    }

    fn bits(values: &[f64]) -> Vec<u64> {
        values.iter().map(|v| v.to_bits()).collect()
    }

    #[test]
    fn constant_prices() {
        let result = analyze(series_from(&[100.0; 40])).unwrap();

        assert_eq!(result.latest_price, 100.0);
        assert!(result.history.daily_return[0].is_nan());
        assert!(result.history.daily_return[1..].iter().all(|&r| r == 0.0));
        assert_eq!(result.volatility, Some(0.0));
        assert_eq!(result.avg_daily_return, Some(0.0));
        assert_eq!(result.sharpe_ratio, None);
        assert_eq!(result.rsi, None);
        assert_approx(result.upper_band.unwrap(), 100.0, 1e-9);
        assert_approx(result.lower_band.unwrap(), 100.0, 1e-9);
        assert_approx(result.avg_bb_gap.unwrap(), 0.0, 1e-9);
        assert_eq!(result.latest_roc, Some(0.0));
        assert_eq!(result.avg_roc, Some(0.0));
    }

    #[test]
    fn linear_uptrend_end_to_end() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let result = analyze(series_from(&closes)).unwrap();

        assert_eq!(result.latest_price, 129.0);
        assert!(result.avg_daily_return.unwrap() > 0.0);
        assert!(result.volatility.unwrap() > 0.0);
        assert!(result.sharpe_ratio.unwrap() > 0.0);
        assert!(result.rsi.unwrap() > 70.0);
        assert!(result.macd.unwrap() > 0.0);
        assert_eq!(result.bar_count(), 30);
    }

    #[test]
    fn strictly_increasing_rsi_is_100() {
        let closes: Vec<f64> = (0..20).map(|i| 50.0 + i as f64 * 0.25).collect();
        let result = analyze(series_from(&closes)).unwrap();
        assert_eq!(result.rsi, Some(100.0));
        for v in &result.history.rsi[13..] {
            assert_eq!(*v, 100.0);
        }
    }

    #[test]
    fn sharpe_uses_bar_count() {
        let closes = [100.0, 102.0, 101.0, 104.0, 103.0, 107.0];
        let result = analyze(series_from(&closes)).unwrap();
        let expected = result.avg_daily_return.unwrap() / result.volatility.unwrap()
            * (closes.len() as f64).sqrt();
        assert_approx(result.sharpe_ratio.unwrap(), expected, 1e-12);
    }

    #[test]
    fn short_series_leaves_windowed_values_undefined() {
        let result = analyze(series_from(&[100.0, 101.0, 100.5, 102.0, 101.0])).unwrap();
        assert!(result.volatility.is_some());
        assert!(result.macd.is_some());
        assert!(result.macd_signal.is_some());
        assert_eq!(result.upper_band, None);
        assert_eq!(result.lower_band, None);
        assert_eq!(result.avg_bb_gap, None);
        assert_eq!(result.rsi, None);
        assert_eq!(result.atr, None);
        assert_eq!(result.avg_roc, None);
        assert_eq!(result.latest_roc, None);
    }

    #[test]
    fn two_bars_has_no_volatility() {
        let result = analyze(series_from(&[100.0, 101.0])).unwrap();
        assert_approx(result.avg_daily_return.unwrap(), 0.01, 1e-12);
        assert_eq!(result.volatility, None);
        assert_eq!(result.sharpe_ratio, None);
    }

    #[test]
    fn single_bar_is_rejected() {
        let err = analyze(series_from(&[100.0])).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientHistory {
                ticker: "TEST".into(),
                bars: 1,
                required: 2
            }
        );
    }

    #[test]
    fn non_positive_close_is_rejected() {
        let mut bars = make_bars(&[100.0, 101.0, 102.0]);
        bars[1] = PriceBar {
            close: 0.0,
            ..bars[1]
        };
        let series = Arc::new(PriceSeries::new("ZERO", bars).unwrap());
        let err = analyze(series).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidClose { .. }));
    }

    #[test]
    fn analysis_is_deterministic() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0 + i as f64 * 0.1)
            .collect();
        let series = series_from(&closes);
        let a = analyze(Arc::clone(&series)).unwrap();
        let b = analyze(series).unwrap();

        assert_eq!(
            a.sharpe_ratio.map(f64::to_bits),
            b.sharpe_ratio.map(f64::to_bits)
        );
        assert_eq!(a.rsi.map(f64::to_bits), b.rsi.map(f64::to_bits));
        assert_eq!(bits(&a.history.rsi), bits(&b.history.rsi));
        assert_eq!(bits(&a.history.macd), bits(&b.history.macd));
        assert_eq!(bits(&a.history.bb_gap), bits(&b.history.bb_gap));
        assert_eq!(bits(&a.history.atr), bits(&b.history.atr));
        assert_eq!(bits(&a.history.roc), bits(&b.history.roc));
    }

    #[test]
    fn input_series_is_shared_not_copied() {
        let series = series_from(&[100.0, 101.0, 102.0]);
        let result = analyze(Arc::clone(&series)).unwrap();
        assert!(Arc::ptr_eq(&series, &result.series));
        assert_eq!(result.closes(), vec![100.0, 101.0, 102.0]);
    }

    #[test]
    fn max_window_covers_macd_slow_span() {
        assert_eq!(AnalysisParams::default().max_window(), 26);
    }

    #[test]
    fn sharpe_zero_volatility_is_undefined() {
        assert_eq!(sharpe(0.01, 0.0, 30), None);
        assert_eq!(sharpe(0.01, f64::NAN, 30), None);
        assert!(sharpe(0.01, 0.02, 25).is_some());
    }
}
