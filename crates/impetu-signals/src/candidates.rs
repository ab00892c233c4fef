//! Candidate screen over the instrument universe.

use impetu_traits::{Candidate, MarketData, PriceSource, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::TradingCalendar;

/// Inclusive close-price band an instrument must stay within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    /// Lowest acceptable close.
    pub min: f64,
    /// Highest acceptable close.
    pub max: f64,
}

/// Configuration for the candidate screen.
///
/// An instrument passes when every close in the window lies inside
/// `price_band`, its mean dollar volume is at least `min_avg_dollar_volume`,
/// and it traded on at least `completeness_ratio` of the window's days.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateFilterConfig {
    /// Close-price band (default: 50 to 2000)
    pub price_band: PriceBand,

    /// Liquidity floor on mean `volume * close` (default: 500M)
    pub min_avg_dollar_volume: f64,

    /// Fraction of calendar days an instrument must have bars on (default: 0.9)
    pub completeness_ratio: f64,
}

impl Default for CandidateFilterConfig {
    fn default() -> Self {
        Self {
            price_band: PriceBand {
                min: 50.0,
                max: 2000.0,
            },
            min_avg_dollar_volume: 500_000_000.0,
            completeness_ratio: 0.9,
        }
    }
}

/// Screens the universe by price band, liquidity and data completeness.
///
/// # Example
///
/// ```ignore
/// use impetu_signals::candidates::CandidateFilter;
///
/// let filter = CandidateFilter::default();
/// let candidates = filter.filter(&source, &calendar).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    config: CandidateFilterConfig,
}

impl CandidateFilter {
    /// Create a new candidate filter with the given configuration.
    #[must_use]
    pub const fn new(config: CandidateFilterConfig) -> Self {
        Self { config }
    }

    /// The filter's configuration.
    #[must_use]
    pub const fn config(&self) -> &CandidateFilterConfig {
        &self.config
    }

    /// Fetch the window's bars from `source` and screen them.
    ///
    /// # Errors
    ///
    /// Propagates source failures and Polars errors. An empty result is
    /// `Ok(vec![])`, not an error.
    pub async fn filter(
        &self,
        source: &dyn PriceSource,
        calendar: &TradingCalendar,
    ) -> Result<Vec<Candidate>> {
        let bars = source
            .window_bars(calendar.first_date, calendar.last_date)
            .await?;
        debug!(bars = bars.len(), "loaded screening window");
        self.screen(&MarketData::from_bars(&bars)?, calendar)
    }

    /// Screen an already loaded window of bars.
    ///
    /// Candidates are ordered by descending average dollar volume, ties
    /// broken by symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame lacks the `symbol`, `date`, `close` or
    /// `volume` column.
    pub fn screen(&self, data: &MarketData, calendar: &TradingCalendar) -> Result<Vec<Candidate>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let band = self.config.price_band;
        let min_days = calendar.day_count as f64 * self.config.completeness_ratio;

        let screened = data
            .data()
            .clone()
            .lazy()
            .with_column(
                (col("volume").cast(DataType::Float64) * col("close")).alias("dollar_volume"),
            )
            .group_by([col("symbol")])
            .agg([
                col("dollar_volume").mean().alias("avg_dollar_volume"),
                col("close").min().alias("min_close"),
                col("close").max().alias("max_close"),
                col("date").n_unique().alias("observed_days"),
            ])
            .filter(
                col("min_close")
                    .gt_eq(lit(band.min))
                    .and(col("max_close").lt_eq(lit(band.max)))
                    .and(col("avg_dollar_volume").gt_eq(lit(self.config.min_avg_dollar_volume)))
                    .and(
                        col("observed_days")
                            .cast(DataType::Float64)
                            .gt_eq(lit(min_days)),
                    ),
            )
            .sort(
                ["avg_dollar_volume", "symbol"],
                SortMultipleOptions::default().with_order_descending_multi([true, false]),
            )
            .collect()?;

        let symbols = screened.column("symbol")?.as_materialized_series().str()?;
        let volumes = screened
            .column("avg_dollar_volume")?
            .as_materialized_series()
            .f64()?;

        let candidates: Vec<Candidate> = symbols
            .into_iter()
            .zip(volumes)
            .filter_map(|(symbol, volume)| {
                Some(Candidate {
                    symbol: symbol?.to_string(),
                    avg_dollar_volume: volume?,
                })
            })
            .collect();

        debug!(
            universe = data.len(),
            candidates = candidates.len(),
            "candidate screen complete"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use impetu_traits::{Date, PriceBar};

    fn calendar(days: usize) -> TradingCalendar {
        let first = Date::from_ymd_opt(2024, 1, 1).unwrap();
        TradingCalendar {
            first_date: first,
            last_date: first + Duration::days(days as i64 - 1),
            day_count: days,
        }
    }

    fn series(
        symbol: &str,
        days: usize,
        close: impl Fn(usize) -> f64,
        volume: i64,
    ) -> Vec<PriceBar> {
        let first = Date::from_ymd_opt(2024, 1, 1).unwrap();
        (0..days)
            .map(|i| {
                let c = close(i);
                PriceBar {
                    symbol: symbol.to_string(),
                    date: first + Duration::days(i as i64),
                    open: c,
                    high: c,
                    low: c,
                    close: c,
                    adj_close: c,
                    volume,
                }
            })
            .collect()
    }

    fn small_floor() -> CandidateFilter {
        CandidateFilter::new(CandidateFilterConfig {
            min_avg_dollar_volume: 1_000_000.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_default_config() {
        let config = CandidateFilterConfig::default();
        assert_eq!(config.price_band.min, 50.0);
        assert_eq!(config.price_band.max, 2000.0);
        assert_eq!(config.completeness_ratio, 0.9);
    }

    #[test]
    fn test_orders_by_dollar_volume() {
        let mut bars = series("AAA", 20, |_| 100.0, 20_000);
        bars.extend(series("BBB", 20, |_| 100.0, 50_000));
        bars.extend(series("CCC", 20, |_| 200.0, 10_000));

        let candidates = small_floor()
            .screen(&MarketData::from_bars(&bars).unwrap(), &calendar(20))
            .unwrap();

        let symbols: Vec<&str> = candidates.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BBB", "AAA", "CCC"]);
        assert_eq!(candidates[0].avg_dollar_volume, 5_000_000.0);
    }

    #[test]
    fn test_rejects_price_leaving_band() {
        let mut bars = series("SPIKE", 20, |i| if i == 7 { 2500.0 } else { 100.0 }, 50_000);
        bars.extend(series("PENNY", 20, |i| if i == 3 { 40.0 } else { 100.0 }, 50_000));
        bars.extend(series("OK", 20, |_| 100.0, 50_000));

        let candidates = small_floor()
            .screen(&MarketData::from_bars(&bars).unwrap(), &calendar(20))
            .unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].symbol, "OK");
    }

    #[test]
    fn test_rejects_illiquid() {
        let bars = series("THIN", 20, |_| 100.0, 1_000);
        let candidates = small_floor()
            .screen(&MarketData::from_bars(&bars).unwrap(), &calendar(20))
            .unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_completeness_threshold() {
        // 18 of 20 days is exactly 90%
        let mut bars = series("EDGE", 18, |_| 100.0, 50_000);
        bars.extend(series("SHORT", 17, |_| 100.0, 50_000));

        let candidates = small_floor()
            .screen(&MarketData::from_bars(&bars).unwrap(), &calendar(20))
            .unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].symbol, "EDGE");
    }

    #[test]
    fn test_never_emits_below_floor_or_outside_band() {
        let mut bars = Vec::new();
        for (i, (close, volume)) in [(60.0, 9_000), (45.0, 90_000), (150.0, 70_000), (1999.0, 600)]
            .into_iter()
            .enumerate()
        {
            bars.extend(series(&format!("S{i}"), 20, move |_| close, volume));
        }

        let filter = small_floor();
        let candidates = filter
            .screen(&MarketData::from_bars(&bars).unwrap(), &calendar(20))
            .unwrap();

        for candidate in &candidates {
            assert!(candidate.avg_dollar_volume >= filter.config().min_avg_dollar_volume);
        }
        let symbols: Vec<&str> = candidates.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["S2", "S3"]);
    }

    #[test]
    fn test_empty_universe_is_ok() {
        let candidates = CandidateFilter::default()
            .screen(&MarketData::from_bars(&[]).unwrap(), &calendar(20))
            .unwrap();
        assert!(candidates.is_empty());
    }
}
