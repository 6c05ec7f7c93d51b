//! Offline price provider backed by one CSV file per ticker.
//!
//! Expects `<dir>/<TICKER>.csv` with a `Date,Open,High,Low,Close,Volume`
//! header. Extra columns (e.g. `Adj Close`) are ignored.

use super::provider::{DataError, DataSource, FetchResult, MarketDataProvider, RawBar};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: Option<f64>,
    #[serde(rename = "High")]
    high: Option<f64>,
    #[serde(rename = "Low")]
    low: Option<f64>,
    #[serde(rename = "Close")]
    close: Option<f64>,
    #[serde(rename = "Volume")]
    volume: Option<f64>,
}

impl From<CsvRow> for RawBar {
    fn from(row: CsvRow) -> Self {
        Self {
            date: row.date,
            open: row.open.unwrap_or(f64::NAN),
            high: row.high.unwrap_or(f64::NAN),
            low: row.low.unwrap_or(f64::NAN),
            close: row.close.unwrap_or(f64::NAN),
            // Some exports write volume as a float
            volume: row.volume.filter(|v| v.is_finite() && *v >= 0.0).unwrap_or(0.0) as u64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    fn read_bars(&self, symbol: &str) -> Result<Vec<RawBar>, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))?;

        reader
            .deserialize::<CsvRow>()
            .map(|row| {
                row.map(RawBar::from)
                    .map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))
            })
            .collect()
    }
}

impl MarketDataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let bars: Vec<RawBar> = self
            .read_bars(symbol)?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();

        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvImport,
        })
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn provider_with(symbol: &str, contents: &str) -> (tempfile::TempDir, CsvProvider) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(format!("{symbol}.csv")), contents).unwrap();
        let provider = CsvProvider::new(dir.path());
        (dir, provider)
    }

    #[test]
    fn reads_and_filters_by_range() {
        let (_dir, provider) = provider_with(
            "AAPL",
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-02,187.15,188.44,183.89,185.64,185.0,82488700\n\
             2024-01-03,184.22,185.88,183.43,184.25,184.0,58414500\n\
             2024-01-04,182.15,183.09,180.88,181.91,181.0,71983600\n",
        );
        let result = provider
            .fetch("AAPL", date(2024, 1, 3), date(2024, 1, 4))
            .unwrap();
        assert_eq!(result.source, DataSource::CsvImport);
        assert_eq!(result.bars.len(), 2);
        assert_eq!(result.bars[0].date, date(2024, 1, 3));
        assert_eq!(result.bars[1].volume, 71_983_600);
    }

    #[test]
    fn empty_cells_become_nan() {
        let (_dir, provider) = provider_with(
            "MSFT",
            "Date,Open,High,Low,Close,Volume\n2024-01-02,,371.0,366.5,370.87,25258600.0\n",
        );
        let bars = provider
            .fetch("MSFT", date(2024, 1, 1), date(2024, 1, 31))
            .unwrap()
            .bars;
        assert!(bars[0].open.is_nan());
        assert_eq!(bars[0].volume, 25_258_600);
    }

    #[test]
    fn missing_file_is_symbol_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvProvider::new(dir.path());
        assert!(provider.is_available());
        assert!(matches!(
            provider.fetch("NOPE", date(2024, 1, 1), date(2024, 1, 31)),
            Err(DataError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn out_of_range_is_no_data() {
        let (_dir, provider) = provider_with(
            "AAPL",
            "Date,Open,High,Low,Close,Volume\n2024-01-02,1,2,0.5,1.5,100\n",
        );
        assert!(matches!(
            provider.fetch("AAPL", date(2023, 1, 1), date(2023, 12, 31)),
            Err(DataError::NoData { .. })
        ));
    }

    #[test]
    fn malformed_date_is_csv_error() {
        let (_dir, provider) = provider_with(
            "BAD",
            "Date,Open,High,Low,Close,Volume\n01/02/2024,1,2,0.5,1.5,100\n",
        );
        assert!(matches!(
            provider.fetch("BAD", date(2024, 1, 1), date(2024, 1, 31)),
            Err(DataError::Csv(_))
        ));
    }
}
