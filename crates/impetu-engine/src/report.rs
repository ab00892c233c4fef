//! Outcome of a recomputation run.

use std::fmt;

use impetu_signals::TradingCalendar;
use impetu_traits::{Date, Horizon, MomentumRecord, Symbol};
use serde::{Deserialize, Serialize};

/// Why an instrument produced no record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Too few bars for a horizon.
    InsufficientHistory {
        /// The horizon that came up short.
        horizon: Horizon,
    },
    /// The price source failed for this instrument.
    DataFetch {
        /// Source error message.
        message: String,
    },
    /// 6M return below the configured minimum.
    BelowReturnThreshold {
        /// Observed 6M return.
        return_rate: f64,
        /// Configured minimum.
        minimum: f64,
    },
    /// 6M Sortino ratio below the configured minimum.
    BelowSortinoThreshold {
        /// Observed 6M Sortino ratio.
        sortino_ratio: f64,
        /// Configured minimum.
        minimum: f64,
    },
    /// A computed field was NaN or infinite.
    NonFinite {
        /// Name of the offending field.
        field: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientHistory { horizon } => {
                write!(f, "insufficient {horizon} history")
            }
            Self::DataFetch { message } => write!(f, "price fetch failed: {message}"),
            Self::BelowReturnThreshold {
                return_rate,
                minimum,
            } => write!(f, "6M return {return_rate:.4} below {minimum}"),
            Self::BelowSortinoThreshold {
                sortino_ratio,
                minimum,
            } => write!(f, "6M Sortino {sortino_ratio:.4} below {minimum}"),
            Self::NonFinite { field } => write!(f, "non-finite {field}"),
        }
    }
}

/// An instrument that passed the screen but was not scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedInstrument {
    /// Instrument identifier.
    pub symbol: Symbol,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Result of one [`Recomputer::recompute`](crate::Recomputer::recompute) run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Date the cross-section was stored under.
    pub evaluation_date: Date,
    /// Trading window the run used.
    pub calendar: TradingCalendar,
    /// Instruments that passed the candidate screen.
    pub candidates: usize,
    /// Records written.
    pub written: usize,
    /// Candidates that produced no record, in candidate order.
    pub skipped: Vec<SkippedInstrument>,
    /// The stored cross-section, score descending then symbol.
    pub records: Vec<MomentumRecord>,
}

impl BatchReport {
    /// Whether the run stored no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.written == 0
    }
}
