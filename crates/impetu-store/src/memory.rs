//! In-process price history and record storage.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use impetu_traits::{
    Date, EvaluationSummary, ImpetuError, MomentumRecord, PriceBar, PriceSource, RecordStore,
    Result, Symbol,
};
use tokio::sync::RwLock;
use tracing::debug;

/// Price bars and scored cross-sections held in memory.
///
/// Each evaluation date's records are replaced by a single map insert under
/// the write lock, so readers see either the old or the new cross-section.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bars: RwLock<BTreeMap<Symbol, BTreeMap<Date, PriceBar>>>,
    records: RwLock<BTreeMap<Date, Vec<MomentumRecord>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with price bars.
    pub async fn with_bars(bars: impl IntoIterator<Item = PriceBar>) -> Self {
        let store = Self::new();
        store.insert_bars(bars).await;
        store
    }

    /// Insert or overwrite bars, keyed by (symbol, date).
    pub async fn insert_bars(&self, bars: impl IntoIterator<Item = PriceBar>) {
        let mut guard = self.bars.write().await;
        for bar in bars {
            guard
                .entry(bar.symbol.clone())
                .or_default()
                .insert(bar.date, bar);
        }
    }

    /// Number of stored bars across all symbols.
    pub async fn bar_count(&self) -> usize {
        self.bars.read().await.values().map(BTreeMap::len).sum()
    }
}

#[async_trait]
impl PriceSource for MemoryStore {
    async fn get_bars(&self, symbol: &str, from: Date, to: Date) -> Result<Vec<PriceBar>> {
        if from > to {
            return Ok(Vec::new());
        }
        let guard = self.bars.read().await;
        Ok(guard
            .get(symbol)
            .map(|series| series.range(from..=to).map(|(_, bar)| bar.clone()).collect())
            .unwrap_or_default())
    }

    async fn list_trading_dates(&self, from: Date, to: Date) -> Result<Vec<Date>> {
        if from > to {
            return Ok(Vec::new());
        }
        let guard = self.bars.read().await;
        let dates: BTreeSet<Date> = guard
            .values()
            .flat_map(|series| series.range(from..=to).map(|(date, _)| *date))
            .collect();
        Ok(dates.into_iter().rev().collect())
    }

    async fn window_bars(&self, from: Date, to: Date) -> Result<Vec<PriceBar>> {
        if from > to {
            return Ok(Vec::new());
        }
        let guard = self.bars.read().await;
        Ok(guard
            .values()
            .flat_map(|series| series.range(from..=to).map(|(_, bar)| bar.clone()))
            .collect())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn replace_records(
        &self,
        evaluation_date: Date,
        records: &[MomentumRecord],
    ) -> Result<()> {
        if let Some(stray) = records.iter().find(|r| r.evaluation_date != evaluation_date) {
            return Err(ImpetuError::InvalidInput(format!(
                "record for {} is dated {}, expected {evaluation_date}",
                stray.symbol, stray.evaluation_date
            )));
        }

        let mut staged = records.to_vec();
        staged.sort_by(MomentumRecord::rank_cmp);

        let mut guard = self.records.write().await;
        if staged.is_empty() {
            guard.remove(&evaluation_date);
        } else {
            guard.insert(evaluation_date, staged);
        }
        debug!(%evaluation_date, records = records.len(), "replaced cross-section");
        Ok(())
    }

    async fn delete_records(&self, evaluation_date: Date) -> Result<u64> {
        let removed = self.records.write().await.remove(&evaluation_date);
        Ok(removed.map_or(0, |r| r.len() as u64))
    }

    async fn query_records(
        &self,
        evaluation_date: Date,
        limit: Option<usize>,
    ) -> Result<Vec<MomentumRecord>> {
        let guard = self.records.read().await;
        let Some(records) = guard.get(&evaluation_date) else {
            return Ok(Vec::new());
        };
        let take = limit.unwrap_or(records.len());
        Ok(records.iter().take(take).cloned().collect())
    }

    async fn list_evaluations(&self) -> Result<Vec<EvaluationSummary>> {
        let guard = self.records.read().await;
        Ok(guard
            .iter()
            .rev()
            .filter_map(|(evaluation_date, records)| {
                let spans = records.iter().map(MomentumRecord::date_span);
                let first_date = spans.clone().map(|(first, _)| first).min()?;
                let last_date = spans.map(|(_, last)| last).max()?;
                Some(EvaluationSummary {
                    evaluation_date: *evaluation_date,
                    first_date,
                    last_date,
                    records: records.len(),
                })
            })
            .collect())
    }
}
