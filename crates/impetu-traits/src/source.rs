//! Collaborator contracts consumed by the engine.
//!
//! The engine never talks to a database or HTTP API directly. It reads price
//! history through [`PriceSource`], fundamentals through
//! [`FundamentalsSource`], and reads/writes scored cross-sections through
//! [`RecordStore`]. Implementations must be thread-safe (`Send + Sync`) so a
//! single instance can serve concurrent per-instrument work.

use async_trait::async_trait;

use crate::{Date, EvaluationSummary, MomentumRecord, PriceBar, RawFundamentals, Result};

/// Read access to daily price history.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Bars for one instrument in `[from, to]`, ascending by date.
    async fn get_bars(&self, symbol: &str, from: Date, to: Date) -> Result<Vec<PriceBar>>;

    /// Distinct dates in `[from, to]` with at least one bar, descending.
    async fn list_trading_dates(&self, from: Date, to: Date) -> Result<Vec<Date>>;

    /// Bars for every instrument in `[from, to]`.
    ///
    /// Used by the candidate screen, which aggregates over the whole
    /// universe. Ordering is unspecified.
    async fn window_bars(&self, from: Date, to: Date) -> Result<Vec<PriceBar>>;
}

/// Per-instrument fundamental ratios.
#[async_trait]
pub trait FundamentalsSource: Send + Sync {
    /// Latest ratios for `symbol`, or `None` when the provider has nothing.
    async fn fundamentals(&self, symbol: &str) -> Result<Option<RawFundamentals>>;
}

/// Storage for scored cross-sections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Atomically replace every record for `evaluation_date` with `records`.
    ///
    /// Readers observe either the previous cross-section or the new one,
    /// never a mix. On failure the previous cross-section stays intact.
    async fn replace_records(
        &self,
        evaluation_date: Date,
        records: &[MomentumRecord],
    ) -> Result<()>;

    /// Delete every record for `evaluation_date`, returning the count removed.
    async fn delete_records(&self, evaluation_date: Date) -> Result<u64>;

    /// Records for `evaluation_date` ordered by score descending, then symbol.
    async fn query_records(
        &self,
        evaluation_date: Date,
        limit: Option<usize>,
    ) -> Result<Vec<MomentumRecord>>;

    /// One summary per stored evaluation date, newest first.
    async fn list_evaluations(&self) -> Result<Vec<EvaluationSummary>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_are_object_safe() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn PriceSource>();
        assert_send_sync::<dyn FundamentalsSource>();
        assert_send_sync::<dyn RecordStore>();
    }
}
