//! Error types for AQI calculation and policy analysis.
//!
//! The calculator and analyzer never substitute a fallback value for missing data. Every problem
//! is reported to the caller as one of the variants below, so that "not enough data" can be told
//! apart from a genuine result.
use thiserror::Error;

/// Errors raised by the AQI calculator and the policy impact analyzer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// A concentration or AQI value is negative, NaN or otherwise non-physical.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required input (a reading or a slice of the series) is empty.
    #[error("No data: {0}")]
    NoData(String),

    /// A slice needed for a comparison is empty or too small for the statistic.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Reference data (breakpoints, bands, catalogue) is malformed or incomplete.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Shorthand for results carrying an [`AnalysisError`].
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Return early with an [`AnalysisError`] of the given variant unless a condition holds.
///
/// This mirrors `anyhow::ensure!` for the typed error.
macro_rules! ensure_or {
    ($cond:expr, $variant:ident, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::AnalysisError::$variant(format!($($arg)+)));
        }
    };
}
pub(crate) use ensure_or;
