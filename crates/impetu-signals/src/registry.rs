//! Registry of the raw signals that feed the momentum score.
//!
//! This module provides metadata and discovery for the six inputs the
//! scorers combine.

use serde::{Deserialize, Serialize};

/// Signal category classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalCategory {
    /// Price momentum signals
    Momentum,
    /// Downside-risk-adjusted return signals
    Risk,
    /// Technical oscillators
    Technical,
    /// Revenue growth signals
    Growth,
    /// Balance-sheet leverage signals
    Leverage,
    /// Valuation signals
    Value,
}

impl SignalCategory {
    /// Get a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Momentum => "Price momentum over the lookback horizon",
            Self::Risk => "Return adjusted for downside volatility",
            Self::Technical => "Overbought/oversold oscillators",
            Self::Growth => "Revenue growth from company filings",
            Self::Leverage => "Debt relative to equity (lower is better)",
            Self::Value => "Price relative to book value (lower is better)",
        }
    }
}

/// Metadata about a signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalInfo {
    /// Unique identifier for the signal
    pub name: &'static str,

    /// Category classification
    pub category: SignalCategory,

    /// Human-readable description
    pub description: &'static str,

    /// Whether the signal is computed separately for each horizon
    pub per_horizon: bool,

    /// Whether larger raw values rank higher
    pub higher_is_better: bool,

    /// Whether the signal comes from the fundamentals provider
    pub requires_fundamentals: bool,
}

/// Get information about all available signals.
#[must_use]
pub fn available_signals() -> Vec<SignalInfo> {
    vec![
        SignalInfo {
            name: "return_rate",
            category: SignalCategory::Momentum,
            description: "Adjusted-close return over the horizon",
            per_horizon: true,
            higher_is_better: true,
            requires_fundamentals: false,
        },
        SignalInfo {
            name: "sortino_ratio",
            category: SignalCategory::Risk,
            description: "Mean daily return over downside deviation",
            per_horizon: true,
            higher_is_better: true,
            requires_fundamentals: false,
        },
        SignalInfo {
            name: "rsi",
            category: SignalCategory::Technical,
            description: "14-period relative strength index of the 6M closes",
            per_horizon: false,
            higher_is_better: false,
            requires_fundamentals: false,
        },
        SignalInfo {
            name: "revenue_growth",
            category: SignalCategory::Growth,
            description: "Year-over-year revenue growth",
            per_horizon: false,
            higher_is_better: true,
            requires_fundamentals: true,
        },
        SignalInfo {
            name: "debt_to_equity",
            category: SignalCategory::Leverage,
            description: "Total debt over shareholder equity",
            per_horizon: false,
            higher_is_better: false,
            requires_fundamentals: true,
        },
        SignalInfo {
            name: "price_to_book",
            category: SignalCategory::Value,
            description: "Market price over book value",
            per_horizon: false,
            higher_is_better: false,
            requires_fundamentals: true,
        },
    ]
}

/// Get signals in a specific category.
#[must_use]
pub fn signals_by_category(category: &SignalCategory) -> Vec<SignalInfo> {
    available_signals()
        .into_iter()
        .filter(|info| &info.category == category)
        .collect()
}

/// Get information about a specific signal by name.
#[must_use]
pub fn get_signal_info(name: &str) -> Option<SignalInfo> {
    available_signals()
        .into_iter()
        .find(|info| info.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_signals() {
        let signals = available_signals();
        assert_eq!(signals.len(), 6);

        let mut names: Vec<_> = signals.iter().map(|s| s.name).collect();
        names.dedup();
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn test_signals_by_category() {
        assert_eq!(signals_by_category(&SignalCategory::Momentum).len(), 1);
        assert_eq!(signals_by_category(&SignalCategory::Value).len(), 1);
    }

    #[test]
    fn test_get_signal_info() {
        let info = get_signal_info("sortino_ratio").unwrap();
        assert_eq!(info.category, SignalCategory::Risk);
        assert!(info.per_horizon);

        assert!(get_signal_info("nonexistent_signal").is_none());
    }

    #[test]
    fn test_direction_flags() {
        assert!(!get_signal_info("debt_to_equity").unwrap().higher_is_better);
        assert!(!get_signal_info("price_to_book").unwrap().higher_is_better);
        assert!(get_signal_info("revenue_growth").unwrap().requires_fundamentals);
        assert!(!get_signal_info("return_rate").unwrap().requires_fundamentals);
    }

    #[test]
    fn test_category_descriptions() {
        assert!(!SignalCategory::Leverage.description().is_empty());
        assert!(!SignalCategory::Technical.description().is_empty());
    }
}
