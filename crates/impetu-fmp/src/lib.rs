//! Financial Modeling Prep (FMP) fundamentals adapter for impetu.
//!
//! This crate implements [`impetu_traits::FundamentalsSource`] over the
//! [Financial Modeling Prep](https://financialmodelingprep.com/) API. It
//! reports the latest annual revenue growth, debt-to-equity and
//! price-to-book as the provider publishes them; defaults and outlier caps
//! are applied by the engine, not here.
//!
//! # Usage
//!
//! ```rust,ignore
//! use impetu_fmp::{FmpClient, RatePolicy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FmpClient::from_env()?.with_rate_policy(&RatePolicy::default())?;
//!
//!     let fundamentals = client.latest_fundamentals("AAPL").await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! Set `FMP_API_KEY` in your environment or `.env` file:
//!
//! ```bash
//! FMP_API_KEY=your_api_key_here
//! ```

mod client;
mod error;
mod throttle;
mod types;

pub use client::FmpClient;
pub use error::FmpError;
pub use throttle::{BackoffPolicy, RatePolicy, Throttle};
pub use types::*;

/// Result type for FMP operations.
pub type Result<T> = std::result::Result<T, FmpError>;
