//! Engine configuration.
//!
//! Every stage keeps its own `*Config`; [`EngineConfig`] gathers them with
//! the run-level settings so a whole deployment can be described by one TOML
//! file. Omitted tables and fields keep their defaults:
//!
//! ```toml
//! max_concurrency = 4
//! min_return_rate = 0.1
//!
//! [candidates]
//! min_avg_dollar_volume = 1e9
//!
//! [calendar]
//! min_trading_days = 15
//! ```

use std::path::Path;
use std::time::Duration;

use impetu_combine::HorizonWeights;
use impetu_signals::{
    CalendarConfig, CandidateFilterConfig, FundamentalsPolicy, PeriodMetricsConfig, RsiConfig,
};
use impetu_traits::{ImpetuError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a recomputation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Trading calendar requirements.
    pub calendar: CalendarConfig,
    /// Candidate screen thresholds.
    pub candidates: CandidateFilterConfig,
    /// Period metrics parameters.
    pub metrics: PeriodMetricsConfig,
    /// Oscillator parameters.
    pub rsi: RsiConfig,
    /// Fundamentals defaults and caps.
    pub fundamentals: FundamentalsPolicy,
    /// Absolute scorer weights.
    pub weights: HorizonWeights,
    /// Instruments evaluated at once (default: 8)
    pub max_concurrency: usize,
    /// Wall-clock limit for one run in seconds (default: 900)
    pub run_timeout_secs: u64,
    /// Limit for one instrument's fundamentals lookup in seconds (default: 30)
    pub fundamentals_timeout_secs: u64,
    /// Skip instruments whose 6M return is below this (default: none)
    pub min_return_rate: Option<f64>,
    /// Skip instruments whose 6M Sortino ratio is below this (default: none)
    pub min_sortino: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            calendar: CalendarConfig::default(),
            candidates: CandidateFilterConfig::default(),
            metrics: PeriodMetricsConfig::default(),
            rsi: RsiConfig::default(),
            fundamentals: FundamentalsPolicy::default(),
            weights: HorizonWeights::default(),
            max_concurrency: 8,
            run_timeout_secs: 900,
            fundamentals_timeout_secs: 30,
            min_return_rate: None,
            min_sortino: None,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetuError::InvalidInput`] if the document does not parse
    /// or fails [`validate`](Self::validate).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ImpetuError::InvalidInput(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ImpetuError::InvalidInput(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Run timeout as a [`Duration`].
    #[must_use]
    pub const fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    /// Fundamentals lookup timeout as a [`Duration`].
    #[must_use]
    pub const fn fundamentals_timeout(&self) -> Duration {
        Duration::from_secs(self.fundamentals_timeout_secs)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetuError::InvalidInput`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(ImpetuError::InvalidInput(msg.to_string()));

        if self.max_concurrency == 0 {
            return invalid("max_concurrency must be at least 1");
        }
        if self.run_timeout_secs == 0 {
            return invalid("run_timeout_secs must be positive");
        }
        if self.fundamentals_timeout_secs == 0 {
            return invalid("fundamentals_timeout_secs must be positive");
        }
        let band = &self.candidates.price_band;
        if !(band.min.is_finite() && band.max.is_finite() && band.min <= band.max) {
            return invalid("candidates.price_band must satisfy min <= max");
        }
        let ratio = self.candidates.completeness_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return invalid("candidates.completeness_ratio must be in (0, 1]");
        }
        if self.rsi.period == 0 {
            return invalid("rsi.period must be positive");
        }
        if !(self.metrics.sortino_cap.is_finite() && self.metrics.sortino_cap > 0.0) {
            return invalid("metrics.sortino_cap must be positive");
        }
        self.weights.validate()
    }
}
