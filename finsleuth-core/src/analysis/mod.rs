//! Indicator engine and its output types.

pub mod engine;
pub mod result;
pub mod set;

pub use engine::{analyze, sharpe, AnalysisError, AnalysisParams, IndicatorEngine, MIN_BARS};
pub use result::{defined, IndicatorHistory, IndicatorResult};
pub use set::AnalysisSet;
