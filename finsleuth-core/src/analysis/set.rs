//! Per-run collection of indicator results, keyed by ticker.

use super::result::IndicatorResult;
use indexmap::IndexMap;

/// Analysis results keyed by ticker.
///
/// Keys are unique. Iteration follows insertion order, which the runner sets
/// to the configured ticker order regardless of which worker finished first.
#[derive(Debug, Clone, Default)]
pub struct AnalysisSet {
    results: IndexMap<String, IndicatorResult>,
}

impl AnalysisSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result under its ticker, returning any result it replaced.
    pub fn insert(&mut self, result: IndicatorResult) -> Option<IndicatorResult> {
        self.results.insert(result.ticker().to_string(), result)
    }

    pub fn get(&self, ticker: &str) -> Option<&IndicatorResult> {
        self.results.get(ticker)
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.results.contains_key(ticker)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndicatorResult)> {
        self.results.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<IndicatorResult> for AnalysisSet {
    fn from_iter<I: IntoIterator<Item = IndicatorResult>>(iter: I) -> Self {
        let mut set = Self::new();
        for result in iter {
            set.insert(result);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::domain::PriceSeries;
    use crate::indicators::make_bars;
    use std::sync::Arc;

    fn result_for(ticker: &str, base: f64) -> IndicatorResult {
        let closes: Vec<f64> = (0..5).map(|i| base + i as f64).collect();
        let series = PriceSeries::new(ticker, make_bars(&closes)).unwrap();
        analyze(Arc::new(series)).unwrap()
    }

    #[test]
    fn keeps_insertion_order() {
        let set: AnalysisSet = ["MSFT", "AAPL", "GOOG"]
            .iter()
            .map(|t| result_for(t, 10.0))
            .collect();
        let tickers: Vec<&str> = set.tickers().collect();
        assert_eq!(tickers, vec!["MSFT", "AAPL", "GOOG"]);
    }

    #[test]
    fn keys_are_unique() {
        let mut set = AnalysisSet::new();
        assert!(set.insert(result_for("AAPL", 10.0)).is_none());
        let replaced = set.insert(result_for("AAPL", 20.0));
        assert!(replaced.is_some());
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("AAPL").unwrap().latest_price, 24.0);
    }

    #[test]
    fn lookup_by_ticker() {
        let set: AnalysisSet = vec![result_for("AAPL", 10.0)].into_iter().collect();
        assert!(set.contains("AAPL"));
        assert!(!set.contains("MSFT"));
        assert!(set.get("MSFT").is_none());
        assert!(!set.is_empty());
    }
}
