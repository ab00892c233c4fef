//! Default and outlier policy for provider fundamentals.
//!
//! Providers report fundamentals with gaps and occasional nonsense values
//! (a debt-to-equity of 120 usually means a percentage slipped through). The
//! engine, not the adapter, decides how those are treated: missing fields
//! take defaults and outliers are replaced by fixed caps.

use impetu_traits::{Fundamentals, RawFundamentals};
use serde::{Deserialize, Serialize};

/// Replacement rule for an outlying ratio.
///
/// A value is replaced by `replacement` when it is non-finite, above
/// `outlier_above`, or outside `[valid_min, valid_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapRule {
    /// Values above this are outliers.
    pub outlier_above: f64,
    /// Lower end of the plausible range.
    pub valid_min: f64,
    /// Upper end of the plausible range.
    pub valid_max: f64,
    /// Value stored in place of an outlier.
    pub replacement: f64,
}

impl CapRule {
    /// Apply the rule to one value.
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        let invalid = !value.is_finite()
            || value > self.outlier_above
            || value < self.valid_min
            || value > self.valid_max;
        if invalid { self.replacement } else { value }
    }
}

/// Defaults and capping applied to every fundamentals snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalsPolicy {
    /// Revenue growth used when unavailable (default: 0.0)
    pub default_revenue_growth: f64,

    /// Debt-to-equity used when unavailable (default: 1.0)
    pub default_debt_to_equity: f64,

    /// Price-to-book used when unavailable (default: 1.5)
    pub default_price_to_book: f64,

    /// Outlier rule for debt-to-equity (default: above 50 or outside [0, 100] becomes 10)
    pub debt_to_equity_cap: CapRule,

    /// Outlier rule for price-to-book (default: above 100 or outside [0, 50] becomes 20)
    pub price_to_book_cap: CapRule,
}

impl Default for FundamentalsPolicy {
    fn default() -> Self {
        Self {
            default_revenue_growth: 0.0,
            default_debt_to_equity: 1.0,
            default_price_to_book: 1.5,
            debt_to_equity_cap: CapRule {
                outlier_above: 50.0,
                valid_min: 0.0,
                valid_max: 100.0,
                replacement: 10.0,
            },
            price_to_book_cap: CapRule {
                outlier_above: 100.0,
                valid_min: 0.0,
                valid_max: 50.0,
                replacement: 20.0,
            },
        }
    }
}

impl FundamentalsPolicy {
    /// The snapshot used when the provider has nothing for an instrument.
    #[must_use]
    pub const fn defaults(&self) -> Fundamentals {
        Fundamentals {
            revenue_growth: self.default_revenue_growth,
            debt_to_equity: self.default_debt_to_equity,
            price_to_book: self.default_price_to_book,
        }
    }

    /// Resolve a provider response into the stored snapshot.
    ///
    /// Missing fields are defaulted individually; reported ratios pass
    /// through the cap rules.
    #[must_use]
    pub fn apply(&self, raw: Option<RawFundamentals>) -> Fundamentals {
        let Some(raw) = raw else {
            return self.defaults();
        };

        let revenue_growth = raw
            .revenue_growth
            .filter(|g| g.is_finite())
            .unwrap_or(self.default_revenue_growth);
        let debt_to_equity = raw
            .debt_to_equity
            .map_or(self.default_debt_to_equity, |d| self.debt_to_equity_cap.apply(d));
        let price_to_book = raw
            .price_to_book
            .map_or(self.default_price_to_book, |p| self.price_to_book_cap.apply(p));

        Fundamentals {
            revenue_growth,
            debt_to_equity,
            price_to_book,
        }
    }
}
