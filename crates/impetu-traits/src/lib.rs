#![doc(issue_tracker_base_url = "https://github.com/factordynamics/impetu/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and collaborator traits for the impetu momentum engine.
//!
//! This crate provides the data model shared by every other crate (price
//! bars, period metrics, momentum records), the error taxonomy, the return
//! statistics helpers, and the async traits through which the engine reaches
//! price history, fundamentals and persistence.

/// The version of the impetu-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod source;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{ImpetuError, Result};
pub use source::{FundamentalsSource, PriceSource, RecordStore};
pub use types::{
    Candidate, Date, EvaluationSummary, Fundamentals, Horizon, HorizonMetrics, MarketData,
    MomentumRecord, PeriodMetrics, PriceBar, RawFundamentals, SubScores, Symbol,
};
