//! Multi-horizon momentum metrics based on adjusted price history.
//!
//! For each lookback horizon (1, 3 and 6 calendar months) this module
//! computes the simple return, the Sortino ratio of daily returns and the
//! average traded dollar volume. Horizons are independent of each other.

mod period;
mod sortino;

pub use period::{
    PeriodMetricsCalculator, PeriodMetricsConfig, average_dollar_volume, percent_change,
    return_rate,
};
pub use sortino::sortino_ratio;
