//! Core trait definition for signal normalizers.

use impetu_traits::{Fundamentals, PeriodMetrics, Result};
use serde::{Deserialize, Serialize};

/// Raw signals for one instrument over one horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalInputs {
    /// Horizon return.
    pub return_rate: f64,
    /// Horizon Sortino ratio.
    pub sortino_ratio: f64,
    /// 14-period RSI.
    pub rsi: f64,
    /// Revenue growth.
    pub revenue_growth: f64,
    /// Debt-to-equity.
    pub debt_to_equity: f64,
    /// Price-to-book.
    pub price_to_book: f64,
}

impl SignalInputs {
    /// Assemble the inputs for one horizon.
    #[must_use]
    pub const fn new(metrics: &PeriodMetrics, rsi: f64, fundamentals: &Fundamentals) -> Self {
        Self {
            return_rate: metrics.return_rate,
            sortino_ratio: metrics.sortino_ratio,
            rsi,
            revenue_growth: fundamentals.revenue_growth,
            debt_to_equity: fundamentals.debt_to_equity,
            price_to_book: fundamentals.price_to_book,
        }
    }
}

/// Signals rescaled to `[0, 1]`, where 1 is always the favourable end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSignals {
    /// Normalized return.
    pub return_rate: f64,
    /// Normalized Sortino ratio.
    pub sortino_ratio: f64,
    /// Normalized RSI.
    pub rsi: f64,
    /// Normalized revenue growth.
    pub revenue_growth: f64,
    /// Normalized leverage (low debt-to-equity scores high).
    pub debt_to_equity: f64,
    /// Normalized valuation (low price-to-book scores high).
    pub price_to_book: f64,
}

impl NormalizedSignals {
    /// Weighted sum of the normalized signals.
    #[must_use]
    pub fn weighted_sum(&self, weights: &SignalWeights) -> f64 {
        self.return_rate * weights.return_rate
            + self.sortino_ratio * weights.sortino_ratio
            + self.rsi * weights.rsi
            + self.revenue_growth * weights.revenue_growth
            + self.debt_to_equity * weights.debt_to_equity
            + self.price_to_book * weights.price_to_book
    }
}

/// One weight per signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights {
    /// Weight on the return.
    pub return_rate: f64,
    /// Weight on the Sortino ratio.
    pub sortino_ratio: f64,
    /// Weight on revenue growth.
    pub revenue_growth: f64,
    /// Weight on the oscillator.
    pub rsi: f64,
    /// Weight on leverage.
    pub debt_to_equity: f64,
    /// Weight on valuation.
    pub price_to_book: f64,
}

impl SignalWeights {
    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.return_rate
            + self.sortino_ratio
            + self.revenue_growth
            + self.rsi
            + self.debt_to_equity
            + self.price_to_book
    }

    /// Whether every weight is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        [
            self.return_rate,
            self.sortino_ratio,
            self.revenue_growth,
            self.rsi,
            self.debt_to_equity,
            self.price_to_book,
        ]
        .iter()
        .all(|w| w.is_finite())
    }
}

/// Maps raw signals into `[0, 1]`.
///
/// Implementors define how the mapping is anchored: to fixed domains, or to
/// the cross-section being scored. All implementations must be thread-safe.
pub trait Normalizer: Send + Sync {
    /// Normalize a batch of inputs, returning one entry per input in order.
    ///
    /// # Errors
    ///
    /// Returns an error when the batch cannot be normalized.
    fn normalize(&self, inputs: &[SignalInputs]) -> Result<Vec<NormalizedSignals>>;

    /// Name of this normalization strategy.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_weighted_sum() {
        let normalized = NormalizedSignals {
            return_rate: 1.0,
            sortino_ratio: 0.5,
            rsi: 0.0,
            revenue_growth: 0.5,
            debt_to_equity: 1.0,
            price_to_book: 0.0,
        };
        let weights = SignalWeights {
            return_rate: 2.0,
            sortino_ratio: 1.0,
            revenue_growth: 1.0,
            rsi: 5.0,
            debt_to_equity: 0.5,
            price_to_book: 3.0,
        };
        assert_relative_eq!(normalized.weighted_sum(&weights), 3.5);
        assert_relative_eq!(weights.total(), 12.5);
        assert!(weights.is_finite());
    }
}
