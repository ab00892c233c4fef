#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/impetu/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # impetu
//!
//! impetu is an umbrella crate that re-exports all impetu sub-crates for
//! convenience.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use impetu::engine::{ComputeRequest, EngineConfig, Recomputer, Trigger};
//! use impetu::fmp::FmpClient;
//! use impetu::store::{DatabaseConfig, PgStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(PgStore::connect(&DatabaseConfig::from_env()?).await?);
//! let fundamentals = Arc::new(FmpClient::from_env()?);
//!
//! let recomputer = Recomputer::new(
//!     EngineConfig::default(),
//!     store.clone(),
//!     fundamentals,
//!     store,
//! )?;
//! let trigger = Trigger::new(Arc::new(recomputer));
//!
//! let response = trigger
//!     .compute(&ComputeRequest {
//!         start_date: "2024-06-01".into(),
//!         end_date: "2024-06-28".into(),
//!     })
//!     .await?;
//! println!("{} records, top {:?}", response.summary.count, response.summary.top_score);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Core types and the collaborator traits
//! - [`signals`] - Calendar, candidate screen and raw signal computation
//! - [`combine`] - Absolute and relative scoring
//! - [`engine`] - Recomputation controller and trigger interface
//! - [`fmp`] - Fundamentals provider client
//! - [`store`] - Price and record stores
//!
//! ## Architecture
//!
//! A recomputation run for an evaluation date:
//!
//! 1. **Calendar** resolves the trading days in the requested window
//! 2. **Candidates** are screened by price band, liquidity and completeness
//! 3. **Signals** are computed per candidate and horizon
//! 4. **Scorers** map signals into sub-scores and a composite in `[0, 1]`
//! 5. **Store** replaces the date's cross-section in one atomic write

/// Version information for the impetu crate.
///
/// This constant contains the current version of impetu as specified in Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Core types and collaborator traits.
///
/// - [`PriceSource`] - Daily bars and trading dates
/// - [`FundamentalsSource`] - Latest fundamental ratios per instrument
/// - [`RecordStore`] - Atomic per-date persistence of momentum records
pub mod traits {
    pub use impetu_traits::*;
}

pub use impetu_traits::{FundamentalsSource, PriceSource, RecordStore};

// Re-export error types
pub use impetu_traits::{ImpetuError, Result};

// Re-export common types
pub use impetu_traits::types::{Date, Horizon, MomentumRecord, PriceBar, Symbol};

// ============================================================================
// Signals
// ============================================================================

/// Calendar resolution, candidate screening and raw signals.
///
/// ## Per-horizon signals
///
/// - **Return rate**: adjusted-close return over the horizon
/// - **Sortino ratio**: mean daily return over downside deviation, with a
///   signed sentinel when there is no downside
///
/// ## Per-instrument signals
///
/// - **RSI**: 14-period Wilder oscillator over the 6M closes
/// - **Fundamentals**: revenue growth, debt-to-equity and price-to-book with
///   defaults and outlier caps
pub mod signals {
    pub use impetu_signals::*;
}

// ============================================================================
// Scoring
// ============================================================================

/// Absolute and relative scoring.
///
/// ## Available Scorers
///
/// - **AbsoluteScorer**: fixed-domain mapping, comparable across dates
/// - **RelativeScorer**: cross-sectional min-max with caller weights,
///   comparable only within one ranking
///
/// The composite blends the sub-scores as
///
/// ```text
/// score = 0.40 * S_1M + 0.35 * S_3M + 0.25 * S_6M
/// ```
pub mod combine {
    pub use impetu_combine::*;
}

// ============================================================================
// Engine
// ============================================================================

/// Recomputation controller, configuration and trigger interface.
pub mod engine {
    pub use impetu_engine::*;
}

// ============================================================================
// Data Providers
// ============================================================================

/// Financial Modeling Prep (FMP) API client.
///
/// ## Setup
///
/// 1. Get an API key at <https://financialmodelingprep.com/>
/// 2. Set the `FMP_API_KEY` environment variable or add to `.env` file
///
/// ## Example
///
/// ```no_run
/// use impetu::fmp::FmpClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = FmpClient::from_env()?;
/// if let Some(raw) = client.latest_fundamentals("AAPL").await? {
///     println!("D/E: {:?}", raw.debt_to_equity);
/// }
/// # Ok(())
/// # }
/// ```
pub mod fmp {
    pub use impetu_fmp::*;
}

/// In-memory and PostgreSQL stores.
pub mod store {
    pub use impetu_store::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```no_run
/// use impetu::prelude::*;
/// ```
///
/// This brings into scope:
/// - Collaborator traits: [`PriceSource`], [`FundamentalsSource`], [`RecordStore`]
/// - Entry points: [`Recomputer`](crate::engine::Recomputer), [`Trigger`](crate::engine::Trigger)
/// - Error types: [`Result`], [`ImpetuError`]
pub mod prelude {
    pub use crate::engine::{EngineConfig, Recomputer, Trigger};
    pub use crate::traits::types::*;
    pub use crate::{FundamentalsSource, PriceSource, RecordStore};
    pub use crate::{ImpetuError, Result};
}

// ============================================================================
// Tests
// ============================================================================
