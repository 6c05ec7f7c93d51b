//! FinSleuth Runner: config, parallel analysis, case file reports, exports.
//!
//! This crate builds on `finsleuth-core` to provide:
//! - TOML run configuration with command-line overrides
//! - Parallel per-ticker indicator analysis
//! - The case file in PDF or plain text
//! - Optional JSON and CSV exports
//! - The end-to-end pipeline used by the CLI

pub mod analyze;
pub mod config;
pub mod export;
pub mod pipeline;
pub mod reporting;

pub use analyze::analyze_evidence;
pub use config::{ConfigError, ConfigOverrides, ReportFormat, RunConfig};
pub use export::{export_history_csv, export_summary_json, write_exports, ExportOptions};
pub use pipeline::{
    build_providers, investigate, run_investigation, run_with_providers, RunError, RunOptions,
    RunSummary,
};
pub use reporting::{
    cleanup_temp_files, compile_case_file, ReportError, ReportOutput, PDF_REPORT_FILE,
    TEXT_REPORT_FILE,
};
