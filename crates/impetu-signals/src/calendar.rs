//! Trading calendar resolution.

use impetu_traits::{Date, ImpetuError, PriceSource, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for calendar resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Minimum number of distinct trading days required in range (default: 15)
    pub min_trading_days: usize,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            min_trading_days: 15,
        }
    }
}

/// The usable trading window inside a requested date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingCalendar {
    /// Earliest trading date with data in range.
    pub first_date: Date,
    /// Latest trading date with data in range.
    pub last_date: Date,
    /// Number of distinct trading dates in range.
    pub day_count: usize,
}

/// Derives the trading window and day count from the price history.
#[derive(Debug, Clone, Default)]
pub struct CalendarResolver {
    config: CalendarConfig,
}

impl CalendarResolver {
    /// Create a resolver with the given configuration.
    #[must_use]
    pub const fn new(config: CalendarConfig) -> Self {
        Self { config }
    }

    /// Minimum trading days this resolver accepts.
    #[must_use]
    pub const fn min_trading_days(&self) -> usize {
        self.config.min_trading_days
    }

    /// Resolve the trading calendar for `[start, end]` from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetuError::InsufficientCalendarData`] when fewer than
    /// `min_trading_days` distinct dates carry bars, and propagates any
    /// source failure.
    pub async fn resolve(
        &self,
        source: &dyn PriceSource,
        start: Date,
        end: Date,
    ) -> Result<TradingCalendar> {
        let dates = source.list_trading_dates(start, end).await?;
        debug!(start = %start, end = %end, days = dates.len(), "listed trading dates");
        self.from_dates(&dates)
    }

    /// Build the calendar from an already listed set of trading dates.
    ///
    /// Input order does not matter; duplicates are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetuError::InsufficientCalendarData`] when too few
    /// distinct dates are present.
    pub fn from_dates(&self, dates: &[Date]) -> Result<TradingCalendar> {
        let mut distinct = dates.to_vec();
        distinct.sort_unstable();
        distinct.dedup();

        let required = self.config.min_trading_days.max(1);
        let (Some(&first_date), Some(&last_date)) = (distinct.first(), distinct.last()) else {
            return Err(ImpetuError::InsufficientCalendarData { found: 0, required });
        };

        if distinct.len() < required {
            return Err(ImpetuError::InsufficientCalendarData {
                found: distinct.len(),
                required,
            });
        }

        Ok(TradingCalendar {
            first_date,
            last_date,
            day_count: distinct.len(),
        })
    }
}
