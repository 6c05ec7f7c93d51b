//! Run configuration: which tickers, which dates, which report.
//!
//! Loaded from a TOML file. Every field is validated up front so that a bad
//! config aborts the run before any network traffic.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Days covered when no start date is configured.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;

/// Default news window in days.
pub const DEFAULT_NEWS_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required config key '{0}'")]
    MissingKey(&'static str),

    #[error("unsupported report format '{0}' (expected 'pdf' or 'txt')")]
    InvalidFormat(String),

    #[error("'stocks' must list at least one ticker")]
    EmptyTickers,

    #[error("invalid date for '{key}': '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { key: &'static str, value: String },

    #[error("start_date {start} is after end_date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Output format of the case file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Pdf,
    Txt,
}

impl ReportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Txt => "txt",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ReportFormat::Pdf),
            "txt" => Ok(ReportFormat::Txt),
            _ => Err(ConfigError::InvalidFormat(s.to_string())),
        }
    }
}

/// The file as written; everything optional so missing keys get a precise error.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    stocks: Option<Vec<String>>,
    start_date: Option<String>,
    end_date: Option<String>,
    report_format: Option<String>,
    output_dir: Option<PathBuf>,
    news_window_days: Option<u32>,
    csv_dir: Option<PathBuf>,
}

/// Validated run configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    pub stocks: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub report_format: ReportFormat,
    pub output_dir: PathBuf,
    pub news_window_days: u32,
    /// Read prices from `<csv_dir>/<TICKER>.csv` instead of Yahoo Finance.
    pub csv_dir: Option<PathBuf>,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub report_format: Option<ReportFormat>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub output_dir: Option<PathBuf>,
    pub csv_dir: Option<PathBuf>,
}

impl RunConfig {
    /// Load and validate a config file, with dates defaulting relative to today.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let content = decode_config(bytes, path);
        Self::from_toml(&content, chrono::Local::now().date_naive())
    }

    /// Parse and validate TOML. `today` anchors the default date range.
    pub fn from_toml(content: &str, today: NaiveDate) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;

        let report_format = raw
            .report_format
            .ok_or(ConfigError::MissingKey("report_format"))?
            .parse::<ReportFormat>()?;
        let stocks = normalize_tickers(raw.stocks.ok_or(ConfigError::MissingKey("stocks"))?)?;

        let end_date = parse_optional_date("end_date", raw.end_date.as_deref())?.unwrap_or(today);
        let start_date = parse_optional_date("start_date", raw.start_date.as_deref())?
            .unwrap_or(end_date - Duration::days(DEFAULT_LOOKBACK_DAYS));

        let news_window_days = raw.news_window_days.unwrap_or(DEFAULT_NEWS_WINDOW_DAYS);
        if news_window_days == 0 {
            return Err(ConfigError::InvalidValue {
                key: "news_window_days",
                reason: "must be at least 1".into(),
            });
        }

        let config = Self {
            stocks,
            start_date,
            end_date,
            report_format,
            output_dir: raw.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            news_window_days,
            csv_dir: raw.csv_dir,
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides and re-validate.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(format) = overrides.report_format {
            self.report_format = format;
        }
        if let Some(start) = overrides.start_date {
            self.start_date = start;
        }
        if let Some(end) = overrides.end_date {
            self.end_date = end;
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        if overrides.csv_dir.is_some() {
            self.csv_dir = overrides.csv_dir;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.start_date > self.end_date {
            return Err(ConfigError::InvertedRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` date; blank counts as absent.
pub fn parse_optional_date(
    key: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, ConfigError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ConfigError::InvalidDate {
                key,
                value: s.to_string(),
            }),
    }
}

/// Decode config bytes as UTF-8, falling back to ISO-8859-1.
fn decode_config(bytes: Vec<u8>, path: &Path) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(
                stage = "config",
                path = %path.display(),
                "config is not valid UTF-8; decoding as ISO-8859-1"
            );
            // Every Latin-1 byte is the Unicode scalar of the same value.
            e.into_bytes().into_iter().map(char::from).collect()
        }
    }
}

/// Trim, drop blanks, and remove duplicates keeping the first occurrence.
fn normalize_tickers(raw: Vec<String>) -> Result<Vec<String>, ConfigError> {
    let mut tickers: Vec<String> = Vec::with_capacity(raw.len());
    for ticker in raw {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            tracing::warn!(stage = "config", "ignoring blank ticker");
            continue;
        }
        if tickers.iter().any(|t| t == ticker) {
            tracing::warn!(stage = "config", ticker, "ignoring duplicate ticker");
            continue;
        }
        tickers.push(ticker.to_string());
    }
    if tickers.is_empty() {
        return Err(ConfigError::EmptyTickers);
    }
    Ok(tickers)
}
