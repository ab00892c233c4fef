//! Per-horizon return, risk and liquidity metrics.

use impetu_traits::stats::simple_returns;
use impetu_traits::{Date, Horizon, PeriodMetrics, PriceBar, PriceSource, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::sortino::sortino_ratio;

/// Configuration for the period metrics calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodMetricsConfig {
    /// Minimum bars a horizon needs before metrics are computed (default: 5)
    pub min_bars: usize,

    /// Magnitude of the Sortino sentinel used when downside risk is zero (default: 5.0)
    pub sortino_cap: f64,
}

impl Default for PeriodMetricsConfig {
    fn default() -> Self {
        Self {
            min_bars: 5,
            sortino_cap: 5.0,
        }
    }
}

/// Computes [`PeriodMetrics`] for one instrument over one horizon.
///
/// # Example
///
/// ```ignore
/// use impetu_signals::momentum::PeriodMetricsCalculator;
///
/// let calculator = PeriodMetricsCalculator::default();
/// let metrics = calculator.compute(&bars);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PeriodMetricsCalculator {
    config: PeriodMetricsConfig,
}

impl PeriodMetricsCalculator {
    /// Create a calculator with the given configuration.
    #[must_use]
    pub const fn new(config: PeriodMetricsConfig) -> Self {
        Self { config }
    }

    /// Get the minimum bar count.
    #[must_use]
    pub const fn min_bars(&self) -> usize {
        self.config.min_bars
    }

    /// Get the Sortino sentinel magnitude.
    #[must_use]
    pub const fn sortino_cap(&self) -> f64 {
        self.config.sortino_cap
    }

    /// Fetch the horizon's bars ending at `end` and compute its metrics.
    ///
    /// Returns `Ok(None)` when the horizon has fewer than `min_bars` bars.
    ///
    /// # Errors
    ///
    /// Propagates price source failures.
    pub async fn fetch_and_compute(
        &self,
        source: &dyn PriceSource,
        symbol: &str,
        horizon: Horizon,
        end: Date,
    ) -> Result<Option<(PeriodMetrics, Vec<PriceBar>)>> {
        let bars = source
            .get_bars(symbol, horizon.start_date(end), end)
            .await?;
        Ok(self.compute(&bars).map(|metrics| (metrics, bars)))
    }

    /// Compute metrics from bars sorted ascending by date.
    ///
    /// Returns `None` when fewer than `min_bars` bars are supplied; that is a
    /// skip signal for the horizon, not an error.
    #[must_use]
    pub fn compute(&self, bars: &[PriceBar]) -> Option<PeriodMetrics> {
        if bars.len() < self.config.min_bars.max(1) {
            return None;
        }
        let first = bars.first()?;
        let last = bars.last()?;

        let adj_closes: Vec<f64> = bars.iter().map(|b| b.adj_close).collect();
        let returns = simple_returns(&adj_closes);

        Some(PeriodMetrics {
            first_date: first.date,
            last_date: last.date,
            first_close: first.adj_close,
            last_close: last.adj_close,
            return_rate: return_rate(first.adj_close, last.adj_close),
            sortino_ratio: sortino_ratio(&returns, self.config.sortino_cap),
            avg_dollar_volume: average_dollar_volume(bars),
        })
    }
}

/// Simple return between two prices, zero when the base is not positive.
#[must_use]
pub fn return_rate(first: f64, last: f64) -> f64 {
    if first > 0.0 && last.is_finite() {
        (last - first) / first
    } else {
        0.0
    }
}

/// Percentage change between the first and last value, zero when undefined.
#[must_use]
pub fn percent_change(values: &[f64]) -> f64 {
    match (values.first(), values.last()) {
        (Some(&first), Some(&last)) if first > 0.0 && last.is_finite() => {
            (last / first - 1.0) * 100.0
        }
        _ => 0.0,
    }
}

/// Rounded mean of `volume * close` over the bars.
///
/// A bar whose dollar volume is NaN or negative contributes zero and is
/// logged.
pub fn average_dollar_volume(bars: &[PriceBar]) -> i64 {
    if bars.is_empty() {
        return 0;
    }

    let total: f64 = bars
        .iter()
        .map(|bar| {
            let value = bar.dollar_volume();
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                warn!(
                    symbol = %bar.symbol,
                    date = %bar.date,
                    volume = bar.volume,
                    close = bar.close,
                    "invalid dollar volume, counting as zero"
                );
                0.0
            }
        })
        .sum();

    (total / bars.len() as f64).round() as i64
}
