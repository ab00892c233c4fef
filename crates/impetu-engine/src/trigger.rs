//! Request-level entry points for an HTTP layer.
//!
//! [`Trigger`] validates string inputs, runs the controller under a timeout
//! and maps failures onto [`TriggerError`], whose
//! [`status_code`](TriggerError::status_code) gives the HTTP status to
//! return. Too few trading days and an empty candidate set are successes
//! with an empty result and an explanatory message.

use std::sync::Arc;
use std::time::Duration;

use impetu_combine::{RankedRecord, RankingWeights, RelativeScorer};
use impetu_traits::{Date, EvaluationSummary, ImpetuError, MomentumRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::controller::Recomputer;
use crate::report::SkippedInstrument;

/// Errors surfaced to the request layer.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// Malformed or inconsistent input.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Nothing stored for the requested date.
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage or a data source is unreachable, or the run was cancelled.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The run exceeded its time budget.
    #[error("run exceeded {0:?}")]
    Timeout(Duration),

    /// Any other failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TriggerError {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::Unavailable(_) => 503,
            Self::Timeout(_) => 504,
            Self::Internal(_) => 500,
        }
    }
}

impl From<ImpetuError> for TriggerError {
    fn from(err: ImpetuError) -> Self {
        match err {
            ImpetuError::InvalidInput(_)
            | ImpetuError::InvalidDate(_)
            | ImpetuError::InsufficientCalendarData { .. } => Self::InvalidRequest(err.to_string()),
            ImpetuError::Persistence(_) | ImpetuError::DataFetch(_) | ImpetuError::Cancelled => {
                Self::Unavailable(err.to_string())
            }
            ImpetuError::InsufficientData(_) | ImpetuError::Polars(_) | ImpetuError::Other(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

/// Result type for trigger operations.
pub type TriggerResult<T> = std::result::Result<T, TriggerError>;

fn parse_date(field: &str, value: &str) -> TriggerResult<Date> {
    Date::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        TriggerError::InvalidRequest(format!("{field} must be yyyy-mm-dd, got {value:?}"))
    })
}

/// Request to recompute a cross-section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeRequest {
    /// First day of the window, `yyyy-mm-dd`.
    pub start_date: String,
    /// Last day of the window and the evaluation date, `yyyy-mm-dd`.
    pub end_date: String,
}

/// Count, top and mean of a set of scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of records.
    pub count: usize,
    /// Highest score, if any.
    pub top_score: Option<f64>,
    /// Mean score, if any.
    pub average_score: Option<f64>,
}

impl Summary {
    /// Summarize `scores`.
    #[must_use]
    pub fn from_scores(scores: &[f64]) -> Self {
        let count = scores.len();
        let top_score = scores.iter().copied().reduce(f64::max);
        let average_score = (count > 0).then(|| scores.iter().sum::<f64>() / count as f64);
        Self {
            count,
            top_score,
            average_score,
        }
    }
}

/// Response to a [`ComputeRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeResponse {
    /// Date the cross-section is stored under.
    pub evaluation_date: Date,
    /// Stored records, score descending then symbol.
    pub records: Vec<MomentumRecord>,
    /// Summary of `records`.
    pub summary: Summary,
    /// Candidates that produced no record.
    pub skipped: Vec<SkippedInstrument>,
    /// Why `records` is empty, when it is.
    pub message: Option<String>,
}

/// Request for the cross-sectional ranking of a stored date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankRequest {
    /// Stored evaluation date, `yyyy-mm-dd`.
    pub evaluation_date: String,
    /// Horizon and caller weights.
    #[serde(default)]
    pub weights: RankingWeights,
}

/// Response to a [`RankRequest`].
///
/// Scores are unbounded weighted sums and only comparable within one
/// response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankResponse {
    /// The ranked evaluation date.
    pub evaluation_date: Date,
    /// Records by relative score descending, then symbol.
    pub records: Vec<RankedRecord>,
    /// Summary of the relative scores.
    pub summary: Summary,
}

/// Entry point for compute, rank and listing requests.
#[derive(Debug, Clone)]
pub struct Trigger {
    recomputer: Arc<Recomputer>,
    timeout: Duration,
}

impl Trigger {
    /// Create a trigger using the controller's configured timeout.
    #[must_use]
    pub fn new(recomputer: Arc<Recomputer>) -> Self {
        let timeout = recomputer.config().run_timeout();
        Self {
            recomputer,
            timeout,
        }
    }

    /// Override the run timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Recompute the cross-section for `request.end_date`.
    ///
    /// # Errors
    ///
    /// See [`TriggerError`] for the mapping of failures.
    pub async fn compute(&self, request: &ComputeRequest) -> TriggerResult<ComputeResponse> {
        self.compute_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Like [`compute`](Self::compute), stopping early when `cancel` fires.
    ///
    /// # Errors
    ///
    /// See [`TriggerError`] for the mapping of failures.
    pub async fn compute_with_cancel(
        &self,
        request: &ComputeRequest,
        cancel: CancellationToken,
    ) -> TriggerResult<ComputeResponse> {
        let start = parse_date("start_date", &request.start_date)?;
        let end = parse_date("end_date", &request.end_date)?;
        if start >= end {
            return Err(TriggerError::InvalidRequest(format!(
                "start_date {start} must be before end_date {end}"
            )));
        }

        let run = self.recomputer.recompute(end, start, end, &cancel);
        let outcome = match tokio::time::timeout(self.timeout, run).await {
            Ok(outcome) => outcome,
            Err(_) => {
                cancel.cancel();
                warn!(timeout = ?self.timeout, "recompute timed out");
                return Err(TriggerError::Timeout(self.timeout));
            }
        };

        match outcome {
            Ok(report) => {
                let scores: Vec<f64> = report.records.iter().map(|r| r.score).collect();
                let message = report.records.is_empty().then(|| {
                    if report.candidates == 0 {
                        "no instruments passed the candidate screen".to_string()
                    } else {
                        format!(
                            "all {} candidates were skipped",
                            report.candidates
                        )
                    }
                });
                info!(
                    evaluation_date = %end,
                    written = report.written,
                    "compute finished"
                );
                Ok(ComputeResponse {
                    evaluation_date: end,
                    summary: Summary::from_scores(&scores),
                    records: report.records,
                    skipped: report.skipped,
                    message,
                })
            }
            Err(ImpetuError::InsufficientCalendarData { found, required }) => {
                Ok(ComputeResponse {
                    evaluation_date: end,
                    records: Vec::new(),
                    summary: Summary::from_scores(&[]),
                    skipped: Vec::new(),
                    message: Some(format!(
                        "not enough trading days between {start} and {end}: {found}/{required}"
                    )),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Rank a stored cross-section with caller weights.
    ///
    /// # Errors
    ///
    /// [`TriggerError::NotFound`] when nothing is stored for the date,
    /// [`TriggerError::InvalidRequest`] for a bad date or weights.
    pub async fn rank(&self, request: &RankRequest) -> TriggerResult<RankResponse> {
        let evaluation_date = parse_date("evaluation_date", &request.evaluation_date)?;
        let scorer = RelativeScorer::new(request.weights)?;

        let stored = self
            .recomputer
            .store()
            .query_records(evaluation_date, None)
            .await?;
        if stored.is_empty() {
            return Err(TriggerError::NotFound(format!(
                "no records for {evaluation_date}"
            )));
        }

        let records = scorer.rank(stored)?;
        let scores: Vec<f64> = records.iter().map(|r| r.score).collect();
        Ok(RankResponse {
            evaluation_date,
            summary: Summary::from_scores(&scores),
            records,
        })
    }

    /// Stored evaluation dates, newest first.
    ///
    /// # Errors
    ///
    /// [`TriggerError::Unavailable`] if the store cannot be read.
    pub async fn evaluations(&self) -> TriggerResult<Vec<EvaluationSummary>> {
        Ok(self.recomputer.store().list_evaluations().await?)
    }
}
