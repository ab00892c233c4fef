//! Error types for the FMP adapter.

use impetu_traits::ImpetuError;
use thiserror::Error;

/// Errors that can occur when using the FMP API.
#[derive(Debug, Error)]
pub enum FmpError {
    /// Missing API key.
    #[error("FMP_API_KEY environment variable not set")]
    MissingApiKey,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error.
    #[error("FMP API error: {0}")]
    Api(String),

    /// Rate limit still exceeded after the configured retries.
    #[error("Rate limit exceeded after {retries} retries")]
    RateLimitExceeded {
        /// Retries attempted before giving up.
        retries: u32,
    },

    /// Invalid rate policy.
    #[error("Invalid rate policy: {0}")]
    InvalidPolicy(String),
}

impl From<FmpError> for ImpetuError {
    fn from(err: FmpError) -> Self {
        Self::DataFetch(err.to_string())
    }
}
