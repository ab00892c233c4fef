//! Recomputation of one evaluation date's cross-section.
//!
//! A run resolves the trading calendar, screens the universe, scores every
//! candidate and replaces the stored cross-section in one write. Candidates
//! are evaluated with bounded concurrency; the three horizons of one
//! candidate are fetched concurrently. Nothing is written until every
//! candidate has been evaluated, so a failed or cancelled run leaves the
//! previous cross-section untouched.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use impetu_combine::AbsoluteScorer;
use impetu_signals::momentum::percent_change;
use impetu_signals::{
    CalendarResolver, CandidateFilter, PeriodMetricsCalculator, Rsi, TradingCalendar,
};
use impetu_traits::{
    Candidate, Date, FundamentalsSource, Horizon, HorizonMetrics, ImpetuError, MomentumRecord,
    PeriodMetrics, PriceBar, PriceSource, RecordStore, Result,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::EngineConfig;
use crate::report::{BatchReport, SkipReason, SkippedInstrument};

type Outcome = std::result::Result<MomentumRecord, SkippedInstrument>;

/// Computes and stores momentum records for an evaluation date.
pub struct Recomputer {
    prices: Arc<dyn PriceSource>,
    fundamentals: Arc<dyn FundamentalsSource>,
    store: Arc<dyn RecordStore>,
    config: EngineConfig,
    calendar: CalendarResolver,
    candidates: CandidateFilter,
    metrics: PeriodMetricsCalculator,
    rsi: Rsi,
    scorer: AbsoluteScorer,
}

impl fmt::Debug for Recomputer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recomputer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Recomputer {
    /// Create a controller over the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetuError::InvalidInput`] if `config` is invalid.
    pub fn new(
        config: EngineConfig,
        prices: Arc<dyn PriceSource>,
        fundamentals: Arc<dyn FundamentalsSource>,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            calendar: CalendarResolver::new(config.calendar.clone()),
            candidates: CandidateFilter::new(config.candidates.clone()),
            metrics: PeriodMetricsCalculator::new(config.metrics.clone()),
            rsi: Rsi::new(config.rsi),
            scorer: AbsoluteScorer::new(config.weights.clone())?,
            prices,
            fundamentals,
            store,
            config,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The record store runs write to.
    #[must_use]
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Recompute and replace the cross-section stored under
    /// `evaluation_date` from bars in `[start, end]`.
    ///
    /// # Errors
    ///
    /// - [`ImpetuError::InvalidDate`] if `start >= end`
    /// - [`ImpetuError::InsufficientCalendarData`] if the range has too few
    ///   trading days; nothing is written
    /// - [`ImpetuError::Cancelled`] if `cancel` fires; nothing is written
    /// - source and store failures, with the prior cross-section intact
    #[instrument(skip(self, cancel))]
    pub async fn recompute(
        &self,
        evaluation_date: Date,
        start: Date,
        end: Date,
        cancel: &CancellationToken,
    ) -> Result<BatchReport> {
        if start >= end {
            return Err(ImpetuError::InvalidDate(format!(
                "start {start} must be before end {end}"
            )));
        }

        let prices = self.prices.as_ref();
        let calendar = self.calendar.resolve(prices, start, end).await?;
        let candidates = self.candidates.filter(prices, &calendar).await?;
        info!(
            days = calendar.day_count,
            first = %calendar.first_date,
            last = %calendar.last_date,
            candidates = candidates.len(),
            "screened universe"
        );

        let now = Utc::now();
        let mut staged = Vec::with_capacity(candidates.len());
        let mut skipped = Vec::new();
        {
            let mut outcomes = stream::iter(&candidates)
                .map(|candidate| self.evaluate(candidate, &calendar, evaluation_date, now, cancel))
                .buffered(self.config.max_concurrency);

            while let Some(outcome) = outcomes.next().await {
                match outcome? {
                    Ok(record) => staged.push(record),
                    Err(skip) => {
                        debug!(symbol = %skip.symbol, reason = %skip.reason, "skipped");
                        skipped.push(skip);
                    }
                }
            }
        }

        if cancel.is_cancelled() {
            return Err(ImpetuError::Cancelled);
        }

        staged.sort_by(MomentumRecord::rank_cmp);
        let previous = self.store.query_records(evaluation_date, None).await?;
        let records = merge_timestamps(staged, &previous, now);
        self.store.replace_records(evaluation_date, &records).await?;

        info!(
            written = records.len(),
            skipped = skipped.len(),
            "stored cross-section"
        );

        Ok(BatchReport {
            evaluation_date,
            calendar,
            candidates: candidates.len(),
            written: records.len(),
            skipped,
            records,
        })
    }

    async fn evaluate(
        &self,
        candidate: &Candidate,
        calendar: &TradingCalendar,
        evaluation_date: Date,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<Outcome> {
        if cancel.is_cancelled() {
            return Err(ImpetuError::Cancelled);
        }

        let symbol = candidate.symbol.as_str();
        let skip = |reason: SkipReason| -> Result<Outcome> {
            Ok(Err(SkippedInstrument {
                symbol: symbol.to_string(),
                reason,
            }))
        };

        let prices = self.prices.as_ref();
        let end = calendar.last_date;
        let (one, three, six) = tokio::join!(
            self.metrics.fetch_and_compute(prices, symbol, Horizon::OneMonth, end),
            self.metrics.fetch_and_compute(prices, symbol, Horizon::ThreeMonths, end),
            self.metrics.fetch_and_compute(prices, symbol, Horizon::SixMonths, end),
        );

        let (one_month, _) = match horizon_outcome(Horizon::OneMonth, one)? {
            Ok(fetched) => fetched,
            Err(reason) => return skip(reason),
        };
        let (three_month, _) = match horizon_outcome(Horizon::ThreeMonths, three)? {
            Ok(fetched) => fetched,
            Err(reason) => return skip(reason),
        };
        let (six_month, six_month_bars) = match horizon_outcome(Horizon::SixMonths, six)? {
            Ok(fetched) => fetched,
            Err(reason) => return skip(reason),
        };

        if let Some(minimum) = self
            .config
            .min_return_rate
            .filter(|min| six_month.return_rate < *min)
        {
            return skip(SkipReason::BelowReturnThreshold {
                return_rate: six_month.return_rate,
                minimum,
            });
        }
        if let Some(minimum) = self
            .config
            .min_sortino
            .filter(|min| six_month.sortino_ratio < *min)
        {
            return skip(SkipReason::BelowSortinoThreshold {
                sortino_ratio: six_month.sortino_ratio,
                minimum,
            });
        }

        let closes: Vec<f64> = six_month_bars.iter().map(|bar| bar.close).collect();
        let rsi = self.rsi.value(&closes);
        let six_month_change = percent_change(&closes);

        let timeout = self.config.fundamentals_timeout();
        let lookup = self.fundamentals.fundamentals(symbol);
        let raw = match tokio::time::timeout(timeout, lookup).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!(symbol, error = %e, "fundamentals unavailable, using defaults");
                None
            }
            Err(_) => {
                warn!(symbol, ?timeout, "fundamentals lookup timed out, using defaults");
                None
            }
        };
        let fundamentals = self.config.fundamentals.apply(raw);

        let metrics = HorizonMetrics {
            one_month,
            three_month,
            six_month,
        };
        let breakdown = self.scorer.score(&metrics, rsi, &fundamentals);

        let record = MomentumRecord {
            evaluation_date,
            symbol: symbol.to_string(),
            metrics,
            rsi,
            six_month_change,
            fundamentals,
            sub_scores: breakdown.sub_scores,
            score: breakdown.score,
            created_at: now,
            updated_at: now,
        };

        if let Some(field) = non_finite_field(&record) {
            warn!(symbol, field, "discarding record with non-finite value");
            return skip(SkipReason::NonFinite {
                field: field.to_string(),
            });
        }

        debug!(symbol, score = record.score, "scored");
        Ok(Ok(record))
    }
}

/// Classify a horizon fetch: a usable result, a per-instrument skip, or a
/// failure that aborts the run.
fn horizon_outcome(
    horizon: Horizon,
    result: Result<Option<(PeriodMetrics, Vec<PriceBar>)>>,
) -> Result<std::result::Result<(PeriodMetrics, Vec<PriceBar>), SkipReason>> {
    match result {
        Ok(Some(fetched)) => Ok(Ok(fetched)),
        Ok(None) => Ok(Err(SkipReason::InsufficientHistory { horizon })),
        Err(ImpetuError::DataFetch(message) | ImpetuError::InsufficientData(message)) => {
            Ok(Err(SkipReason::DataFetch { message }))
        }
        Err(e) => Err(e),
    }
}

fn non_finite_field(record: &MomentumRecord) -> Option<&'static str> {
    let m = &record.metrics;
    let fields = [
        ("one_month.return_rate", m.one_month.return_rate),
        ("one_month.sortino_ratio", m.one_month.sortino_ratio),
        ("three_month.return_rate", m.three_month.return_rate),
        ("three_month.sortino_ratio", m.three_month.sortino_ratio),
        ("six_month.return_rate", m.six_month.return_rate),
        ("six_month.sortino_ratio", m.six_month.sortino_ratio),
        ("rsi", record.rsi),
        ("six_month_change", record.six_month_change),
        ("score", record.score),
    ];
    fields
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(name, _)| name)
}

/// Carry timestamps over from the stored cross-section.
///
/// A record whose payload is unchanged keeps both stored timestamps, so an
/// identical rerun reproduces the stored rows exactly. A changed record keeps
/// its original `created_at` and takes `now` as `updated_at`.
#[must_use]
pub fn merge_timestamps(
    staged: Vec<MomentumRecord>,
    previous: &[MomentumRecord],
    now: DateTime<Utc>,
) -> Vec<MomentumRecord> {
    let previous: HashMap<&str, &MomentumRecord> = previous
        .iter()
        .map(|record| (record.symbol.as_str(), record))
        .collect();

    staged
        .into_iter()
        .map(|mut record| {
            if let Some(prior) = previous.get(record.symbol.as_str()) {
                record.created_at = prior.created_at;
                record.updated_at = if record.same_payload(prior) {
                    prior.updated_at
                } else {
                    now
                };
            }
            record
        })
        .collect()
}
