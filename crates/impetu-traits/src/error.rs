//! Error types for the impetu engine.
//!
//! Every fallible operation in the workspace returns [`ImpetuError`]. The
//! variants follow the engine's failure taxonomy: input validation, data
//! insufficiency, external provider failures, persistence failures and
//! cancellation.

use thiserror::Error;

/// The main error type for impetu operations.
#[derive(Debug, Error)]
pub enum ImpetuError {
    /// Caller supplied malformed or inconsistent input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A date string could not be parsed or a date range is inverted.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Too few distinct trading days exist in the requested window.
    #[error("Insufficient calendar data: {found} trading days, {required} required")]
    InsufficientCalendarData {
        /// Distinct trading days found in range.
        found: usize,
        /// Minimum number of trading days required.
        required: usize,
    },

    /// Not enough observations to compute a metric.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// An external price or fundamentals provider failed.
    #[error("Data fetch error: {0}")]
    DataFetch(String),

    /// Reading or writing the record store failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// The run was cancelled before completion.
    #[error("Recomputation cancelled")]
    Cancelled,

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl ImpetuError {
    /// Whether retrying the same call later may succeed.
    ///
    /// Persistence and provider failures are transient from the caller's
    /// point of view; validation and data shortfalls are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::DataFetch(_))
    }
}

impl From<String> for ImpetuError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for ImpetuError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for impetu operations.
pub type Result<T> = std::result::Result<T, ImpetuError>;
