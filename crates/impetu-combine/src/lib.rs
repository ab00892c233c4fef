//! Normalization and scoring strategies for impetu.
//!
//! Two strategies map raw signals into `[0, 1]` and combine them:
//! - [`AbsoluteScorer`]: fixed domains and per-horizon weights summing to 1.
//!   Produces the stored composite; every sub-score and the final score are
//!   bounded to `[0, 1]`.
//! - [`RelativeScorer`]: min-max against the ranked set with caller weights.
//!   Scores are unbounded.
//!
//! # Examples
//!
//! ```rust,no_run
//! use impetu_combine::{AbsoluteScorer, HorizonWeights};
//! use impetu_traits::{Fundamentals, HorizonMetrics};
//!
//! fn composite(metrics: &HorizonMetrics, rsi: f64, fundamentals: &Fundamentals) -> f64 {
//!     let scorer = AbsoluteScorer::new(HorizonWeights::default()).unwrap();
//!     scorer.score(metrics, rsi, fundamentals).score
//! }
//! ```

mod absolute;
mod normalizer;
mod relative;

// Re-export main types
pub use absolute::{
    AbsoluteScorer, CompositeWeights, FixedDomainNormalizer, HorizonWeights, ScoreBreakdown,
};
pub use normalizer::{NormalizedSignals, Normalizer, SignalInputs, SignalWeights};
pub use relative::{CrossSectionalNormalizer, RankedRecord, RankingWeights, RelativeScorer};
