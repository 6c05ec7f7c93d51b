//! Ingest: raw provider bars to a validated `PriceSeries`.
//!
//! Drops void bars and bars that break the OHLC invariant, then sorts by date
//! and dedupes (first surviving occurrence wins). Counts of everything dropped are
//! returned so the gatherer can log them.

use super::provider::{DataError, RawBar};
use crate::domain::{PriceBar, PriceSeries};

/// A cleaned series plus what was thrown away to get it.
#[derive(Debug, Clone)]
pub struct IngestResult {
    pub series: PriceSeries,
    pub void_dropped: usize,
    pub duplicates_dropped: usize,
    pub insane_dropped: usize,
}

impl IngestResult {
    pub fn dropped(&self) -> usize {
        self.void_dropped + self.duplicates_dropped + self.insane_dropped
    }
}

pub fn ingest(symbol: &str, raw: Vec<RawBar>) -> Result<IngestResult, DataError> {
    let total = raw.len();
    let mut bars: Vec<PriceBar> = raw
        .into_iter()
        .map(|r| PriceBar {
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
        })
        .filter(|b| !b.is_void())
        .collect();
    let void_dropped = total - bars.len();

    let before_sanity = bars.len();
    bars.retain(PriceBar::is_sane);
    let insane_dropped = before_sanity - bars.len();

    // Stable sort keeps the provider's order among same-date bars.
    bars.sort_by_key(|b| b.date);
    let before_dedup = bars.len();
    bars.dedup_by_key(|b| b.date);
    let duplicates_dropped = before_dedup - bars.len();

    if bars.is_empty() {
        return Err(DataError::NoData {
            symbol: symbol.to_string(),
        });
    }

    Ok(IngestResult {
        series: PriceSeries::new(symbol, bars)?,
        void_dropped,
        duplicates_dropped,
        insane_dropped,
    })
}
