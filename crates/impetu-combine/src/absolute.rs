//! Fixed-domain scoring for the stored composite.
//!
//! Each raw signal is clamped into a fixed domain and rescaled linearly, so
//! a score means the same thing regardless of which other instruments were
//! evaluated alongside it.

use crate::normalizer::{NormalizedSignals, Normalizer, SignalInputs, SignalWeights};
use impetu_traits::stats::clamp_finite;
use impetu_traits::{Fundamentals, Horizon, HorizonMetrics, ImpetuError, Result, SubScores};
use serde::{Deserialize, Serialize};

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Normalizer anchored to fixed domains per signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDomainNormalizer;

impl FixedDomainNormalizer {
    /// Normalize one instrument's signals.
    #[must_use]
    pub fn normalize_one(inputs: &SignalInputs) -> NormalizedSignals {
        NormalizedSignals {
            return_rate: (clamp_finite(inputs.return_rate, -1.0, 1.0) + 1.0) / 2.0,
            sortino_ratio: (clamp_finite(inputs.sortino_ratio, -3.0, 3.0) + 3.0) / 6.0,
            rsi: (100.0 - clamp_finite(inputs.rsi, 0.0, 100.0)) / 100.0,
            revenue_growth: clamp_finite(inputs.revenue_growth, -0.5, 0.5) + 0.5,
            debt_to_equity: inverse_ratio(inputs.debt_to_equity),
            price_to_book: inverse_ratio(inputs.price_to_book),
        }
    }
}

impl Normalizer for FixedDomainNormalizer {
    fn normalize(&self, inputs: &[SignalInputs]) -> Result<Vec<NormalizedSignals>> {
        Ok(inputs.iter().map(Self::normalize_one).collect())
    }

    fn name(&self) -> &str {
        "FixedDomain"
    }
}

/// `min(1, 1 / max(0.1, x))`: lower ratios score higher, saturating at 0.1.
fn inverse_ratio(value: f64) -> f64 {
    if value.is_nan() {
        return 1.0;
    }
    (1.0 / value.max(0.1)).min(1.0)
}

/// Blend of the three horizon sub-scores into the final composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    /// Weight on the 1M sub-score (default: 0.40)
    pub one_month: f64,
    /// Weight on the 3M sub-score (default: 0.35)
    pub three_month: f64,
    /// Weight on the 6M sub-score (default: 0.25)
    pub six_month: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            one_month: 0.40,
            three_month: 0.35,
            six_month: 0.25,
        }
    }
}

/// Per-horizon signal weights and the composite blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonWeights {
    /// Signal weights for the 1M sub-score.
    pub one_month: SignalWeights,
    /// Signal weights for the 3M sub-score.
    pub three_month: SignalWeights,
    /// Signal weights for the 6M sub-score.
    pub six_month: SignalWeights,
    /// Composite blend of the sub-scores.
    pub composite: CompositeWeights,
}

impl Default for HorizonWeights {
    fn default() -> Self {
        Self {
            one_month: SignalWeights {
                return_rate: 0.35,
                sortino_ratio: 0.20,
                revenue_growth: 0.20,
                rsi: 0.15,
                debt_to_equity: 0.05,
                price_to_book: 0.05,
            },
            three_month: SignalWeights {
                return_rate: 0.30,
                sortino_ratio: 0.25,
                revenue_growth: 0.25,
                rsi: 0.10,
                debt_to_equity: 0.05,
                price_to_book: 0.05,
            },
            six_month: SignalWeights {
                return_rate: 0.25,
                sortino_ratio: 0.25,
                revenue_growth: 0.30,
                rsi: 0.05,
                debt_to_equity: 0.10,
                price_to_book: 0.05,
            },
            composite: CompositeWeights::default(),
        }
    }
}

impl HorizonWeights {
    /// Signal weights for one horizon.
    #[must_use]
    pub const fn for_horizon(&self, horizon: Horizon) -> &SignalWeights {
        match horizon {
            Horizon::OneMonth => &self.one_month,
            Horizon::ThreeMonths => &self.three_month,
            Horizon::SixMonths => &self.six_month,
        }
    }

    /// Check that every weight vector is non-negative and sums to 1.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetuError::InvalidInput`] naming the offending vector.
    pub fn validate(&self) -> Result<()> {
        for horizon in Horizon::ALL {
            let weights = self.for_horizon(horizon);
            check_unit_sum(&format!("{horizon} weights"), weights.total(), weights.is_finite())?;
            let values = [
                weights.return_rate,
                weights.sortino_ratio,
                weights.revenue_growth,
                weights.rsi,
                weights.debt_to_equity,
                weights.price_to_book,
            ];
            if values.iter().any(|w| *w < 0.0) {
                return Err(ImpetuError::InvalidInput(format!(
                    "{horizon} weights must be non-negative"
                )));
            }
        }

        let c = &self.composite;
        let values = [c.one_month, c.three_month, c.six_month];
        if values.iter().any(|w| *w < 0.0) {
            return Err(ImpetuError::InvalidInput(
                "composite weights must be non-negative".into(),
            ));
        }
        check_unit_sum(
            "composite weights",
            values.iter().sum(),
            values.iter().all(|w| w.is_finite()),
        )
    }
}

fn check_unit_sum(label: &str, total: f64, finite: bool) -> Result<()> {
    if !finite || (total - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(ImpetuError::InvalidInput(format!(
            "{label} must sum to 1, got {total}"
        )));
    }
    Ok(())
}

/// Output of the absolute scorer for one instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// Per-horizon sub-scores, each in `[0, 1]`.
    pub sub_scores: SubScores,
    /// Final composite in `[0, 1]`.
    pub score: f64,
}

/// Scores instruments on fixed domains with per-horizon weights.
///
/// Every sub-score and the final composite lie in `[0, 1]`.
#[derive(Debug, Clone, Default)]
pub struct AbsoluteScorer {
    weights: HorizonWeights,
}

impl AbsoluteScorer {
    /// Create a scorer after validating the weights.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetuError::InvalidInput`] if any weight vector does not
    /// sum to 1.
    pub fn new(weights: HorizonWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }

    /// Weights in use.
    #[must_use]
    pub const fn weights(&self) -> &HorizonWeights {
        &self.weights
    }

    /// Sub-score for one horizon, clamped to `[0, 1]`.
    #[must_use]
    pub fn sub_score(&self, horizon: Horizon, inputs: &SignalInputs) -> f64 {
        let normalized = FixedDomainNormalizer::normalize_one(inputs);
        clamp_finite(
            normalized.weighted_sum(self.weights.for_horizon(horizon)),
            0.0,
            1.0,
        )
    }

    /// Score one instrument from its horizon metrics, RSI and fundamentals.
    #[must_use]
    pub fn score(
        &self,
        metrics: &HorizonMetrics,
        rsi: f64,
        fundamentals: &Fundamentals,
    ) -> ScoreBreakdown {
        let sub = |horizon: Horizon| {
            self.sub_score(horizon, &SignalInputs::new(metrics.get(horizon), rsi, fundamentals))
        };
        let sub_scores = SubScores {
            one_month: sub(Horizon::OneMonth),
            three_month: sub(Horizon::ThreeMonths),
            six_month: sub(Horizon::SixMonths),
        };

        let c = &self.weights.composite;
        let blended = c.one_month * sub_scores.one_month
            + c.three_month * sub_scores.three_month
            + c.six_month * sub_scores.six_month;

        ScoreBreakdown {
            sub_scores,
            score: clamp_finite(blended.max(0.0), 0.0, 1.0),
        }
    }
}
