//! Cross-sectional ranking with caller-supplied weights.
//!
//! Each metric is min-max rescaled against the records being ranked, so a
//! normalized value only has meaning within that set. Weights are not
//! required to sum to 1 and the weighted sum is not clamped: scores from
//! this view are unbounded and are not comparable with stored composites.

use std::cmp::Ordering;

use crate::normalizer::{NormalizedSignals, Normalizer, SignalInputs, SignalWeights};
use impetu_traits::stats::{clamp_finite, min_max_normalize};
use impetu_traits::{Horizon, ImpetuError, MomentumRecord, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Normalizer anchored to the min and max of the batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossSectionalNormalizer;

impl CrossSectionalNormalizer {
    fn column(inputs: &[SignalInputs], field: impl Fn(&SignalInputs) -> f64) -> Array1<f64> {
        inputs.iter().map(field).collect()
    }

    fn scaled(inputs: &[SignalInputs], field: impl Fn(&SignalInputs) -> f64) -> Array1<f64> {
        min_max_normalize(&Self::column(inputs, field)).0
    }

    /// Lower raw values map to higher scores; a degenerate range maps to 1.
    fn inverted(inputs: &[SignalInputs], field: impl Fn(&SignalInputs) -> f64) -> Array1<f64> {
        Self::scaled(inputs, field).mapv(|x| 1.0 - x)
    }
}

impl Normalizer for CrossSectionalNormalizer {
    fn normalize(&self, inputs: &[SignalInputs]) -> Result<Vec<NormalizedSignals>> {
        let return_rate = Self::scaled(inputs, |s| s.return_rate);
        let sortino_ratio = Self::scaled(inputs, |s| s.sortino_ratio);
        let revenue_growth = Self::scaled(inputs, |s| s.revenue_growth);
        let debt_to_equity = Self::inverted(inputs, |s| s.debt_to_equity);
        let price_to_book = Self::inverted(inputs, |s| s.price_to_book);

        Ok(inputs
            .iter()
            .enumerate()
            .map(|(i, s)| NormalizedSignals {
                return_rate: return_rate[i],
                sortino_ratio: sortino_ratio[i],
                rsi: clamp_finite((s.rsi - 30.0) / 40.0, 0.0, 1.0),
                revenue_growth: revenue_growth[i],
                debt_to_equity: debt_to_equity[i],
                price_to_book: price_to_book[i],
            })
            .collect())
    }

    fn name(&self) -> &str {
        "CrossSectional"
    }
}

/// Caller weights and horizon for the ranking view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    /// Horizon whose return and Sortino ratio are ranked (default: 6M)
    pub horizon: Horizon,
    /// Weight per normalized signal; need not sum to 1.
    pub weights: SignalWeights,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            horizon: Horizon::SixMonths,
            weights: SignalWeights {
                return_rate: 1.0,
                sortino_ratio: 1.0,
                revenue_growth: 1.0,
                rsi: 1.0,
                debt_to_equity: 1.0,
                price_to_book: 1.0,
            },
        }
    }
}

/// A stored record with its cross-sectional view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRecord {
    /// The stored record.
    pub record: MomentumRecord,
    /// Signals rescaled against the ranked set.
    pub normalized: NormalizedSignals,
    /// Unbounded weighted sum of `normalized`.
    pub score: f64,
}

/// Ranks a set of records relative to each other.
#[derive(Debug, Clone, Default)]
pub struct RelativeScorer {
    weights: RankingWeights,
}

impl RelativeScorer {
    /// Create a scorer with the given caller weights.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetuError::InvalidInput`] if any weight is not finite.
    pub fn new(weights: RankingWeights) -> Result<Self> {
        if !weights.weights.is_finite() {
            return Err(ImpetuError::InvalidInput(
                "ranking weights must be finite".into(),
            ));
        }
        Ok(Self { weights })
    }

    /// Weights in use.
    #[must_use]
    pub const fn weights(&self) -> &RankingWeights {
        &self.weights
    }

    /// Rank `records` by score descending, ties broken by instrument id.
    ///
    /// # Errors
    ///
    /// Propagates normalization failures.
    pub fn rank(&self, records: Vec<MomentumRecord>) -> Result<Vec<RankedRecord>> {
        let horizon = self.weights.horizon;
        let inputs: Vec<SignalInputs> = records
            .iter()
            .map(|r| SignalInputs::new(r.metrics.get(horizon), r.rsi, &r.fundamentals))
            .collect();
        let normalized = CrossSectionalNormalizer.normalize(&inputs)?;

        let mut ranked: Vec<RankedRecord> = records
            .into_iter()
            .zip(normalized)
            .map(|(record, normalized)| RankedRecord {
                score: normalized.weighted_sum(&self.weights.weights),
                record,
                normalized,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.record.symbol.cmp(&b.record.symbol))
        });
        Ok(ranked)
    }
}
