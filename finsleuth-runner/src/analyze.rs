//! Parallel indicator analysis over gathered evidence.

use finsleuth_core::analysis::{AnalysisError, AnalysisSet, IndicatorEngine, IndicatorResult};
use finsleuth_core::data::EvidenceLocker;
use rayon::prelude::*;
use std::sync::Arc;

/// Analyze every ticker in the locker, in parallel.
///
/// Results land in the set in the locker's (configured) order regardless of
/// which worker finishes first. Tickers the engine rejects are logged and
/// left out.
pub fn analyze_evidence(engine: &IndicatorEngine, locker: &EvidenceLocker) -> AnalysisSet {
    let work: Vec<(&str, &_)> = locker.iter().collect();

    let outcomes: Vec<(&str, Result<IndicatorResult, AnalysisError>)> = work
        .par_iter()
        .map(|&(ticker, evidence)| (ticker, engine.analyze(Arc::clone(&evidence.series))))
        .collect();

    let mut set = AnalysisSet::new();
    for (ticker, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                tracing::debug!(ticker, stage = "analyze", bars = result.bar_count(), "analyzed");
                set.insert(result);
            }
            Err(e) => {
                tracing::error!(ticker, stage = "analyze", error = %e, "excluded from report");
            }
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use finsleuth_core::data::{
        gather_evidence, DataError, DataSource, FetchResult, GatherRequest, MarketDataProvider,
        RawBar, TracingProgress,
    };

    /// Serves `len` bars per ticker, where `len` is looked up by ticker.
    struct SizedPrices(Vec<(&'static str, usize)>);

    impl MarketDataProvider for SizedPrices {
        fn name(&self) -> &str {
            "sized"
        }

        fn fetch(
            &self,
            symbol: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<FetchResult, DataError> {
            let len = self
                .0
                .iter()
                .find(|(t, _)| *t == symbol)
                .map(|(_, n)| *n)
                .unwrap_or(0);
            let bars = (0..len)
                .map(|i| {
                    let close = 50.0 + (i as f64 * 0.7).sin() * 5.0;
                    RawBar {
                        date: start + chrono::Duration::days(i as i64),
                        open: close,
                        high: close + 0.5,
                        low: close - 0.5,
                        close,
                        volume: 500,
                    }
                })
                .collect();
            Ok(FetchResult {
                symbol: symbol.to_string(),
                bars,
                source: DataSource::CsvImport,
            })
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    fn locker_for(prices: &SizedPrices, tickers: &[&str]) -> EvidenceLocker {
        let request = GatherRequest {
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            news_window_days: 30,
        };
        gather_evidence(prices, None, &request, &TracingProgress).unwrap()
    }

    #[test]
    fn keeps_configured_order() {
        let tickers = ["ZZZ", "AAA", "MMM", "BBB", "YYY", "CCC"];
        let prices = SizedPrices(tickers.iter().map(|t| (*t, 60)).collect());
        let set = analyze_evidence(&IndicatorEngine::default(), &locker_for(&prices, &tickers));
        assert_eq!(set.tickers().collect::<Vec<_>>(), tickers.to_vec());
    }

    #[test]
    fn rejected_series_is_dropped() {
        let prices = SizedPrices(vec![("GOOD", 40), ("ONE", 1)]);
        let set = analyze_evidence(
            &IndicatorEngine::default(),
            &locker_for(&prices, &["GOOD", "ONE"]),
        );
        assert_eq!(set.len(), 1);
        assert!(set.contains("GOOD"));
    }
}
