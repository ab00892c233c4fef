//! Common types used throughout the impetu engine.
//!
//! This module defines the price bars the engine consumes, the per-horizon
//! metrics it derives, and the [`MomentumRecord`] it persists.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{ImpetuError, Result};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A market symbol identifier, e.g. "AAPL".
pub type Symbol = String;

/// Lookback window over which return and risk metrics are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Horizon {
    /// One calendar month.
    OneMonth,
    /// Three calendar months.
    ThreeMonths,
    /// Six calendar months.
    SixMonths,
}

impl Horizon {
    /// All horizons, shortest first.
    pub const ALL: [Self; 3] = [Self::OneMonth, Self::ThreeMonths, Self::SixMonths];

    /// Length of the horizon in calendar months.
    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            Self::OneMonth => 1,
            Self::ThreeMonths => 3,
            Self::SixMonths => 6,
        }
    }

    /// Short label ("1M", "3M", "6M").
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::SixMonths => "6M",
        }
    }

    /// First calendar date of the horizon ending at `end`.
    ///
    /// Month arithmetic clamps to the last day of shorter months, so a
    /// horizon ending on 2024-03-31 starts on 2024-02-29 for one month.
    #[must_use]
    pub fn start_date(self, end: Date) -> Date {
        end.checked_sub_months(Months::new(self.months()))
            .unwrap_or(Date::MIN)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Horizon {
    type Err = ImpetuError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1m" | "1" => Ok(Self::OneMonth),
            "3m" | "3" => Ok(Self::ThreeMonths),
            "6m" | "6" => Ok(Self::SixMonths),
            other => Err(ImpetuError::InvalidInput(format!(
                "unknown horizon '{other}', expected one of 1m, 3m, 6m"
            ))),
        }
    }
}

/// One daily OHLCV bar for an instrument.
///
/// Bars are unique per `(symbol, date)` and are read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Instrument identifier.
    pub symbol: Symbol,
    /// Trading date.
    pub date: Date,
    /// Opening price.
    pub open: f64,
    /// Session high.
    pub high: f64,
    /// Session low.
    pub low: f64,
    /// Raw closing price.
    pub close: f64,
    /// Split/dividend adjusted closing price.
    pub adj_close: f64,
    /// Shares traded.
    pub volume: i64,
}

impl PriceBar {
    /// Traded dollar volume for the session (`volume * close`).
    #[must_use]
    pub fn dollar_volume(&self) -> f64 {
        self.volume as f64 * self.close
    }
}

/// An instrument that passed the candidate screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Instrument identifier.
    pub symbol: Symbol,
    /// Mean of `volume * close` over the screening window.
    pub avg_dollar_volume: f64,
}

/// Return and risk statistics for one instrument over one horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    /// Date of the first bar in the horizon.
    pub first_date: Date,
    /// Date of the last bar in the horizon.
    pub last_date: Date,
    /// Adjusted close of the first bar.
    pub first_close: f64,
    /// Adjusted close of the last bar.
    pub last_close: f64,
    /// Simple return between the first and last adjusted close.
    pub return_rate: f64,
    /// Mean daily return over downside deviation, bounded by the sentinel cap.
    pub sortino_ratio: f64,
    /// Rounded mean of `volume * close`.
    pub avg_dollar_volume: i64,
}

/// Metrics for all three horizons of one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonMetrics {
    /// One-month metrics.
    pub one_month: PeriodMetrics,
    /// Three-month metrics.
    pub three_month: PeriodMetrics,
    /// Six-month metrics.
    pub six_month: PeriodMetrics,
}

impl HorizonMetrics {
    /// Metrics for the given horizon.
    #[must_use]
    pub const fn get(&self, horizon: Horizon) -> &PeriodMetrics {
        match horizon {
            Horizon::OneMonth => &self.one_month,
            Horizon::ThreeMonths => &self.three_month,
            Horizon::SixMonths => &self.six_month,
        }
    }
}

/// Fundamental ratios as reported by a provider, each possibly missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFundamentals {
    /// Year-over-year revenue growth as a fraction.
    pub revenue_growth: Option<f64>,
    /// Total debt over shareholder equity.
    pub debt_to_equity: Option<f64>,
    /// Market price over book value per share.
    pub price_to_book: Option<f64>,
}

/// Fundamental ratios after the engine's default and capping policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    /// Year-over-year revenue growth as a fraction.
    pub revenue_growth: f64,
    /// Total debt over shareholder equity.
    pub debt_to_equity: f64,
    /// Market price over book value per share.
    pub price_to_book: f64,
}

/// Per-horizon scores in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    /// One-month sub-score.
    pub one_month: f64,
    /// Three-month sub-score.
    pub three_month: f64,
    /// Six-month sub-score.
    pub six_month: f64,
}

impl SubScores {
    /// Sub-score for the given horizon.
    #[must_use]
    pub const fn get(&self, horizon: Horizon) -> f64 {
        match horizon {
            Horizon::OneMonth => self.one_month,
            Horizon::ThreeMonths => self.three_month,
            Horizon::SixMonths => self.six_month,
        }
    }
}

/// Persisted momentum score for one instrument on one evaluation date.
///
/// Keyed by `(evaluation_date, symbol)`. Records for a date are replaced as
/// a whole; they are never mutated field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumRecord {
    /// Date the cross-section was computed for.
    pub evaluation_date: Date,
    /// Instrument identifier.
    pub symbol: Symbol,
    /// Period metrics for 1M/3M/6M.
    pub metrics: HorizonMetrics,
    /// 14-period RSI over the six-month close series.
    pub rsi: f64,
    /// Percentage change of the raw close over the six-month series.
    pub six_month_change: f64,
    /// Fundamentals snapshot after defaults and capping.
    pub fundamentals: Fundamentals,
    /// Per-horizon sub-scores.
    pub sub_scores: SubScores,
    /// Final composite score in `[0, 1]`.
    pub score: f64,
    /// When the row was first written.
    pub created_at: DateTime<Utc>,
    /// When the row's payload last changed.
    pub updated_at: DateTime<Utc>,
}

impl MomentumRecord {
    /// Whether two records carry the same payload, ignoring timestamps.
    #[must_use]
    pub fn same_payload(&self, other: &Self) -> bool {
        self.evaluation_date == other.evaluation_date
            && self.symbol == other.symbol
            && self.metrics == other.metrics
            && self.rsi == other.rsi
            && self.six_month_change == other.six_month_change
            && self.fundamentals == other.fundamentals
            && self.sub_scores == other.sub_scores
            && self.score == other.score
    }

    /// Ranking order: score descending, ties by symbol ascending.
    #[must_use]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.symbol.cmp(&other.symbol))
    }

    /// Earliest and latest bar dates across all horizons.
    #[must_use]
    pub fn date_span(&self) -> (Date, Date) {
        let periods = [
            &self.metrics.one_month,
            &self.metrics.three_month,
            &self.metrics.six_month,
        ];
        let first = periods.iter().map(|p| p.first_date).min().unwrap_or(Date::MIN);
        let last = periods.iter().map(|p| p.last_date).max().unwrap_or(Date::MIN);
        (first, last)
    }
}

/// Summary of one stored evaluation date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    /// The evaluation date.
    pub evaluation_date: Date,
    /// Earliest first bar date across the date's records.
    pub first_date: Date,
    /// Latest last bar date across the date's records.
    pub last_date: Date,
    /// Number of stored records.
    pub records: usize,
}

/// Container for a window of price bars as a columnar frame.
///
/// `MarketData` wraps a Polars DataFrame with one row per bar and the
/// columns `symbol`, `date`, `close`, `adj_close` and `volume`.
///
/// # Example
///
/// ```no_run
/// use impetu_traits::MarketData;
/// use polars::prelude::*;
///
/// let df = df! {
///     "symbol" => &["AAPL", "MSFT"],
///     "close" => &[150.0, 300.0],
///     "volume" => &[1_000_000i64, 2_000_000],
/// }.unwrap();
///
/// let market_data = MarketData::new(df);
/// ```
#[derive(Debug, Clone)]
pub struct MarketData {
    data: DataFrame,
}

impl MarketData {
    /// Creates a new `MarketData` instance from a DataFrame.
    pub const fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Builds the columnar form of a slice of bars.
    ///
    /// # Errors
    ///
    /// Returns an error if Polars fails to assemble the frame.
    pub fn from_bars(bars: &[PriceBar]) -> Result<Self> {
        let symbols: Vec<&str> = bars.iter().map(|b| b.symbol.as_str()).collect();
        let dates: Vec<Date> = bars.iter().map(|b| b.date).collect();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let adj_closes: Vec<f64> = bars.iter().map(|b| b.adj_close).collect();
        let volumes: Vec<i64> = bars.iter().map(|b| b.volume).collect();

        let data = df! {
            "symbol" => symbols,
            "date" => dates,
            "close" => closes,
            "adj_close" => adj_closes,
            "volume" => volumes,
        }?;

        Ok(Self::new(data))
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Returns the number of rows in the market data.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the market data is empty.
    pub fn is_empty(&self) -> bool {
        self.data.height() == 0
    }

    /// Checks if a column exists in the market data.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }
}

impl From<DataFrame> for MarketData {
    fn from(data: DataFrame) -> Self {
        Self::new(data)
    }
}

impl AsRef<DataFrame> for MarketData {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}
