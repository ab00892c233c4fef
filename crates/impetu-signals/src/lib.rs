//! Signal computation for the impetu momentum engine.
//!
//! This crate provides the leaf stages of the scoring pipeline:
//! - Calendar: usable trading window and day count for a date range
//! - Candidates: price band, liquidity and completeness screen
//! - Momentum: per-horizon return, Sortino ratio and dollar volume
//! - Oscillator: 14-period RSI
//! - Fundamentals: default and outlier policy for provider ratios
//!
//! # Example
//!
//! ```ignore
//! use impetu_signals::calendar::CalendarResolver;
//! use impetu_signals::candidates::CandidateFilter;
//!
//! let calendar = CalendarResolver::default().resolve(&source, start, end).await?;
//! let candidates = CandidateFilter::default().filter(&source, &calendar).await?;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod calendar;
pub mod candidates;
pub mod fundamentals;
pub mod momentum;
pub mod oscillator;
pub mod registry;

// Re-export key types
pub use calendar::{CalendarConfig, CalendarResolver, TradingCalendar};
pub use candidates::{CandidateFilter, CandidateFilterConfig, PriceBand};
pub use fundamentals::{CapRule, FundamentalsPolicy};
pub use momentum::{PeriodMetricsCalculator, PeriodMetricsConfig};
pub use oscillator::{Rsi, RsiConfig};
pub use registry::{SignalCategory, SignalInfo};
