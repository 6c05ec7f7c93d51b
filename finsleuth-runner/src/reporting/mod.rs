//! Report compiler: turns an analysis set into the case file on disk.

pub mod format;
pub mod pdf;
pub mod text;

pub use pdf::render_pdf;
pub use text::render_text;

use crate::config::ReportFormat;
use finsleuth_core::analysis::AnalysisSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const TEXT_REPORT_FILE: &str = "financial_case_file.txt";
pub const PDF_REPORT_FILE: &str = "financial_case_file_complete.pdf";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("nothing to report: the analysis set is empty")]
    Empty,

    #[error("report file {0} was not created")]
    MissingOutput(PathBuf),
}

impl ReportError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> ReportError + '_ {
        move |source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The written case file and any intermediates the caller should remove.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutput {
    pub output_file: PathBuf,
    pub temp_files: Vec<PathBuf>,
}

impl ReportOutput {
    /// Fails with `MissingOutput` unless the case file exists on disk.
    pub fn verify(&self) -> Result<(), ReportError> {
        if self.output_file.is_file() {
            Ok(())
        } else {
            Err(ReportError::MissingOutput(self.output_file.clone()))
        }
    }
}

/// Render the set in the requested format into `output_dir`.
///
/// The PDF is assembled in memory, so `temp_files` is always empty for the
/// formats supported today.
pub fn compile_case_file(
    set: &AnalysisSet,
    format: ReportFormat,
    output_dir: &Path,
) -> Result<ReportOutput, ReportError> {
    if set.is_empty() {
        return Err(ReportError::Empty);
    }
    fs::create_dir_all(output_dir).map_err(ReportError::io(output_dir))?;

    let (file_name, bytes) = match format {
        ReportFormat::Txt => (TEXT_REPORT_FILE, render_text(set).into_bytes()),
        ReportFormat::Pdf => (PDF_REPORT_FILE, render_pdf(set)?),
    };
    let output_file = output_dir.join(file_name);
    fs::write(&output_file, &bytes).map_err(ReportError::io(&output_file))?;

    tracing::info!(
        stage = "report",
        format = %format,
        tickers = set.len(),
        bytes = bytes.len(),
        path = %output_file.display(),
        "case file written"
    );
    Ok(ReportOutput {
        output_file,
        temp_files: Vec::new(),
    })
}

/// Delete intermediates, warning on any that cannot be removed. Returns how many were deleted.
pub fn cleanup_temp_files(paths: &[PathBuf]) -> usize {
    let mut removed = 0;
    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!(
                stage = "cleanup",
                path = %path.display(),
                error = %e,
                "could not remove temp file"
            ),
        }
    }
    removed
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, NaiveDate};
    use finsleuth_core::analysis::{analyze, AnalysisSet, IndicatorResult};
    use finsleuth_core::domain::{PriceBar, PriceSeries};
    use std::sync::Arc;

    /// Daily bars with a 1% high/low band around each close.
    pub fn bars(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1_000,
            })
            .collect()
    }

    pub fn result_for(ticker: &str, closes: &[f64]) -> IndicatorResult {
        let series = PriceSeries::new(ticker, bars(closes)).unwrap();
        analyze(Arc::new(series)).unwrap()
    }

    pub fn set_of(results: Vec<IndicatorResult>) -> AnalysisSet {
        let mut set = AnalysisSet::new();
        for result in results {
            set.insert(result);
        }
        set
    }
}
