//! End-to-end runs of the recomputation pipeline against in-memory stores.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use approx::assert_relative_eq;
use async_trait::async_trait;
use chrono::{Datelike, Duration, Weekday};
use impetu_engine::{
    ComputeRequest, EngineConfig, RankRequest, Recomputer, SkipReason, Summary, Trigger,
    TriggerError,
};
use impetu_store::MemoryStore;
use impetu_traits::{
    Date, EvaluationSummary, FundamentalsSource, ImpetuError, MomentumRecord, PriceBar,
    PriceSource, RawFundamentals, RecordStore, Result,
};
use tokio_util::sync::CancellationToken;

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd_opt(y, m, d).unwrap()
}

fn business_days(from: Date, to: Date) -> Vec<Date> {
    let mut days = Vec::new();
    let mut day = from;
    while day <= to {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(day);
        }
        day += Duration::days(1);
    }
    days
}

fn series(symbol: &str, days: &[Date], volume: i64, close: impl Fn(usize) -> f64) -> Vec<PriceBar> {
    days.iter()
        .enumerate()
        .map(|(i, &day)| {
            let c = close(i);
            PriceBar {
                symbol: symbol.to_string(),
                date: day,
                open: c,
                high: c * 1.01,
                low: c * 0.99,
                close: c,
                adj_close: c,
                volume,
            }
        })
        .collect()
}

/// Three liquid names plus one failing each screen.
fn universe() -> Vec<PriceBar> {
    let days = business_days(date(2023, 12, 1), date(2024, 6, 28));
    let wiggle = |i: usize| [0.0, 1.5, -1.0, 2.0, -0.5][i % 5];

    let mut bars = Vec::new();
    bars.extend(series("AAA", &days, 10_000_000, |i| 100.0 + 0.4 * i as f64 + wiggle(i)));
    bars.extend(series("BBB", &days, 5_000_000, |i| 200.0 + 3.0 * wiggle(i)));
    bars.extend(series("CCC", &days, 4_000_000, |i| 300.0 - 0.35 * i as f64 + wiggle(i)));
    bars.extend(series("PENNY", &days, 900_000_000, |_| 10.0));
    bars.extend(series("THIN", &days, 1_000, |i| 120.0 + wiggle(i)));
    let sparse: Vec<Date> = days.iter().copied().step_by(2).collect();
    bars.extend(series("GAPPY", &sparse, 10_000_000, |i| 150.0 + wiggle(i)));
    bars
}

#[derive(Default)]
struct StubFundamentals {
    responses: HashMap<String, std::result::Result<Option<RawFundamentals>, String>>,
}

impl StubFundamentals {
    fn with(
        mut self,
        symbol: &str,
        response: std::result::Result<Option<RawFundamentals>, String>,
    ) -> Self {
        self.responses.insert(symbol.to_string(), response);
        self
    }
}

#[async_trait]
impl FundamentalsSource for StubFundamentals {
    async fn fundamentals(&self, symbol: &str) -> Result<Option<RawFundamentals>> {
        match self.responses.get(symbol) {
            Some(Ok(raw)) => Ok(*raw),
            Some(Err(message)) => Err(ImpetuError::DataFetch(message.clone())),
            None => Ok(Some(RawFundamentals {
                revenue_growth: Some(0.08),
                debt_to_equity: Some(0.6),
                price_to_book: Some(3.0),
            })),
        }
    }
}

/// Fundamentals source that never answers for one symbol.
struct HangingFundamentals {
    symbol: &'static str,
    others: StubFundamentals,
}

#[async_trait]
impl FundamentalsSource for HangingFundamentals {
    async fn fundamentals(&self, symbol: &str) -> Result<Option<RawFundamentals>> {
        if symbol == self.symbol {
            std::future::pending::<()>().await;
        }
        self.others.fundamentals(symbol).await
    }
}

/// Price source whose per-instrument reads fail for one symbol.
struct FailingPrices {
    inner: MemoryStore,
    symbol: &'static str,
}

#[async_trait]
impl PriceSource for FailingPrices {
    async fn get_bars(&self, symbol: &str, from: Date, to: Date) -> Result<Vec<PriceBar>> {
        if symbol == self.symbol {
            return Err(ImpetuError::DataFetch("statement timeout".into()));
        }
        self.inner.get_bars(symbol, from, to).await
    }

    async fn list_trading_dates(&self, from: Date, to: Date) -> Result<Vec<Date>> {
        self.inner.list_trading_dates(from, to).await
    }

    async fn window_bars(&self, from: Date, to: Date) -> Result<Vec<PriceBar>> {
        self.inner.window_bars(from, to).await
    }
}

/// Record store whose writes can be made to fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn replace_records(
        &self,
        evaluation_date: Date,
        records: &[MomentumRecord],
    ) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ImpetuError::Persistence("connection reset".into()));
        }
        self.inner.replace_records(evaluation_date, records).await
    }

    async fn delete_records(&self, evaluation_date: Date) -> Result<u64> {
        self.inner.delete_records(evaluation_date).await
    }

    async fn query_records(
        &self,
        evaluation_date: Date,
        limit: Option<usize>,
    ) -> Result<Vec<MomentumRecord>> {
        self.inner.query_records(evaluation_date, limit).await
    }

    async fn list_evaluations(&self) -> Result<Vec<EvaluationSummary>> {
        self.inner.list_evaluations().await
    }
}

struct Harness {
    store: Arc<FlakyStore>,
    recomputer: Arc<Recomputer>,
    trigger: Trigger,
}

async fn harness_with(config: EngineConfig, fundamentals: StubFundamentals) -> Harness {
    let prices = Arc::new(MemoryStore::with_bars(universe()).await);
    harness_over(config, prices, Arc::new(fundamentals))
}

fn harness_over(
    config: EngineConfig,
    prices: Arc<dyn PriceSource>,
    fundamentals: Arc<dyn FundamentalsSource>,
) -> Harness {
    let store = Arc::new(FlakyStore::default());
    let recomputer =
        Arc::new(Recomputer::new(config, prices, fundamentals, store.clone()).unwrap());
    Harness {
        trigger: Trigger::new(recomputer.clone()),
        store,
        recomputer,
    }
}

async fn harness() -> Harness {
    harness_with(EngineConfig::default(), StubFundamentals::default()).await
}

fn june() -> ComputeRequest {
    ComputeRequest {
        start_date: "2024-06-01".into(),
        end_date: "2024-06-28".into(),
    }
}

#[tokio::test]
async fn test_compute_scores_screened_candidates() {
    let h = harness().await;
    let response = h.trigger.compute(&june()).await.unwrap();

    assert_eq!(response.evaluation_date, date(2024, 6, 28));
    assert!(response.message.is_none());
    assert!(response.skipped.is_empty());

    let mut symbols: Vec<_> = response.records.iter().map(|r| r.symbol.as_str()).collect();
    symbols.sort_unstable();
    assert_eq!(symbols, ["AAA", "BBB", "CCC"]);

    for record in &response.records {
        assert!((0.0..=1.0).contains(&record.score));
        for sub in [
            record.sub_scores.one_month,
            record.sub_scores.three_month,
            record.sub_scores.six_month,
        ] {
            assert!((0.0..=1.0).contains(&sub));
        }
        assert!((0.0..=100.0).contains(&record.rsi));
        assert_eq!(record.metrics.one_month.last_date, date(2024, 6, 28));
    }

    assert!(
        response
            .records
            .windows(2)
            .all(|pair| pair[0].score >= pair[1].score)
    );
    assert_eq!(response.summary.count, 3);
    assert_relative_eq!(response.summary.top_score.unwrap(), response.records[0].score);
}

#[tokio::test]
async fn test_rising_name_outranks_falling_name() {
    let h = harness().await;
    let response = h.trigger.compute(&june()).await.unwrap();

    let score = |symbol: &str| {
        response
            .records
            .iter()
            .find(|r| r.symbol == symbol)
            .map(|r| r.score)
            .unwrap()
    };
    assert!(score("AAA") > score("CCC"));

    let aaa = response.records.iter().find(|r| r.symbol == "AAA").unwrap();
    assert!(aaa.metrics.six_month.return_rate > 0.0);
    assert!(aaa.six_month_change > 0.0);
}

#[tokio::test]
async fn test_recompute_is_idempotent() {
    let h = harness().await;
    let evaluation_date = date(2024, 6, 28);

    h.trigger.compute(&june()).await.unwrap();
    let first = h.store.query_records(evaluation_date, None).await.unwrap();

    h.trigger.compute(&june()).await.unwrap();
    let second = h.store.query_records(evaluation_date, None).await.unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_debt_to_equity_outlier_is_capped() {
    let fundamentals = StubFundamentals::default().with(
        "AAA",
        Ok(Some(RawFundamentals {
            revenue_growth: Some(0.1),
            debt_to_equity: Some(120.0),
            price_to_book: Some(2.0),
        })),
    );
    let h = harness_with(EngineConfig::default(), fundamentals).await;
    let response = h.trigger.compute(&june()).await.unwrap();

    let aaa = response.records.iter().find(|r| r.symbol == "AAA").unwrap();
    assert_relative_eq!(aaa.fundamentals.debt_to_equity, 10.0);
    assert_relative_eq!(aaa.fundamentals.price_to_book, 2.0);
}

#[tokio::test]
async fn test_fundamentals_failure_uses_defaults() {
    let fundamentals = StubFundamentals::default()
        .with("BBB", Err("provider timeout".into()))
        .with("CCC", Ok(None));
    let h = harness_with(EngineConfig::default(), fundamentals).await;
    let response = h.trigger.compute(&june()).await.unwrap();

    assert_eq!(response.records.len(), 3);
    for symbol in ["BBB", "CCC"] {
        let record = response.records.iter().find(|r| r.symbol == symbol).unwrap();
        assert_relative_eq!(record.fundamentals.revenue_growth, 0.0);
        assert_relative_eq!(record.fundamentals.debt_to_equity, 1.0);
        assert_relative_eq!(record.fundamentals.price_to_book, 1.5);
    }
}

#[tokio::test]
async fn test_hanging_fundamentals_time_out_to_defaults() {
    let config = EngineConfig {
        fundamentals_timeout_secs: 1,
        ..EngineConfig::default()
    };
    let prices = Arc::new(MemoryStore::with_bars(universe()).await);
    let fundamentals = Arc::new(HangingFundamentals {
        symbol: "BBB",
        others: StubFundamentals::default(),
    });
    let h = harness_over(config, prices, fundamentals);
    let response = h.trigger.compute(&june()).await.unwrap();

    assert_eq!(response.records.len(), 3);
    let bbb = response.records.iter().find(|r| r.symbol == "BBB").unwrap();
    assert_relative_eq!(bbb.fundamentals.revenue_growth, 0.0);
    assert_relative_eq!(bbb.fundamentals.debt_to_equity, 1.0);
    assert_relative_eq!(bbb.fundamentals.price_to_book, 1.5);

    let aaa = response.records.iter().find(|r| r.symbol == "AAA").unwrap();
    assert_relative_eq!(aaa.fundamentals.debt_to_equity, 0.6);
}

#[tokio::test]
async fn test_price_read_failure_skips_one_instrument() {
    let prices = Arc::new(FailingPrices {
        inner: MemoryStore::with_bars(universe()).await,
        symbol: "BBB",
    });
    let h = harness_over(
        EngineConfig::default(),
        prices,
        Arc::new(StubFundamentals::default()),
    );
    let response = h.trigger.compute(&june()).await.unwrap();

    let mut symbols: Vec<_> = response.records.iter().map(|r| r.symbol.as_str()).collect();
    symbols.sort_unstable();
    assert_eq!(symbols, ["AAA", "CCC"]);

    let skip = response.skipped.iter().find(|s| s.symbol == "BBB").unwrap();
    assert!(matches!(skip.reason, SkipReason::DataFetch { .. }));

    let stored = h.store.query_records(date(2024, 6, 28), None).await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_stored_records_summary() {
    let h = harness().await;
    let evaluation_date = date(2024, 6, 28);
    let response = h.trigger.compute(&june()).await.unwrap();

    let mut records = response.records;
    for (record, score) in records.iter_mut().zip([0.30, 0.82, 0.55]) {
        record.score = score;
    }
    records.swap(0, 2);
    h.store.replace_records(evaluation_date, &records).await.unwrap();

    let stored = h.store.query_records(evaluation_date, None).await.unwrap();
    let scores: Vec<f64> = stored.iter().map(|r| r.score).collect();
    assert_eq!(scores, [0.82, 0.55, 0.30]);

    let summary = Summary::from_scores(&scores);
    assert_eq!(summary.count, 3);
    assert_relative_eq!(summary.top_score.unwrap(), 0.82);
    assert_relative_eq!(summary.average_score.unwrap(), 0.5567, epsilon = 1e-4);

    let top = h.store.query_records(evaluation_date, Some(1)).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_relative_eq!(top[0].score, 0.82);
}

#[tokio::test]
async fn test_return_threshold_skips_falling_name() {
    let config = EngineConfig {
        min_return_rate: Some(0.0),
        ..EngineConfig::default()
    };
    let h = harness_with(config, StubFundamentals::default()).await;
    let response = h.trigger.compute(&june()).await.unwrap();

    assert!(response.records.iter().all(|r| r.symbol != "CCC"));
    let skip = response.skipped.iter().find(|s| s.symbol == "CCC").unwrap();
    assert!(matches!(skip.reason, SkipReason::BelowReturnThreshold { .. }));
}

#[tokio::test]
async fn test_short_window_is_empty_success() {
    let h = harness().await;
    let response = h
        .trigger
        .compute(&ComputeRequest {
            start_date: "2024-06-17".into(),
            end_date: "2024-06-28".into(),
        })
        .await
        .unwrap();

    assert!(response.records.is_empty());
    assert_eq!(response.summary.count, 0);
    assert!(response.message.unwrap().contains("10/15"));
    assert!(h.store.list_evaluations().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_screen_is_empty_success() {
    let mut config = EngineConfig::default();
    config.candidates.min_avg_dollar_volume = 1e15;
    let h = harness_with(config, StubFundamentals::default()).await;
    let response = h.trigger.compute(&june()).await.unwrap();

    assert!(response.records.is_empty());
    assert!(response.message.is_some());
}

#[tokio::test]
async fn test_invalid_input_is_client_error() {
    let h = harness().await;

    let reversed = ComputeRequest {
        start_date: "2024-06-28".into(),
        end_date: "2024-06-01".into(),
    };
    let err = h.trigger.compute(&reversed).await.unwrap_err();
    assert_eq!(err.status_code(), 400);

    let malformed = ComputeRequest {
        start_date: "06/01/2024".into(),
        end_date: "2024-06-28".into(),
    };
    let err = h.trigger.compute(&malformed).await.unwrap_err();
    assert!(matches!(err, TriggerError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_cancelled_run_writes_nothing() {
    let h = harness().await;
    let evaluation_date = date(2024, 6, 28);
    h.trigger.compute(&june()).await.unwrap();
    let before = h.store.query_records(evaluation_date, None).await.unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = h
        .recomputer
        .recompute(evaluation_date, date(2024, 5, 1), evaluation_date, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ImpetuError::Cancelled));

    let after = h.store.query_records(evaluation_date, None).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_persistence_failure_keeps_prior_cross_section() {
    let h = harness().await;
    let evaluation_date = date(2024, 6, 28);
    h.trigger.compute(&june()).await.unwrap();
    let before = h.store.query_records(evaluation_date, None).await.unwrap();

    h.store.fail_writes.store(true, Ordering::SeqCst);
    let err = h.trigger.compute(&june()).await.unwrap_err();
    assert_eq!(err.status_code(), 503);

    let after = h.store.query_records(evaluation_date, None).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_rank_and_evaluations() {
    let h = harness().await;
    h.trigger.compute(&june()).await.unwrap();

    let ranked = h
        .trigger
        .rank(&RankRequest {
            evaluation_date: "2024-06-28".into(),
            weights: Default::default(),
        })
        .await
        .unwrap();
    assert_eq!(ranked.records.len(), 3);
    assert!(
        ranked
            .records
            .windows(2)
            .all(|pair| pair[0].score >= pair[1].score)
    );

    let missing = h
        .trigger
        .rank(&RankRequest {
            evaluation_date: "2024-05-31".into(),
            weights: Default::default(),
        })
        .await
        .unwrap_err();
    assert_eq!(missing.status_code(), 404);

    let evaluations = h.trigger.evaluations().await.unwrap();
    assert_eq!(evaluations.len(), 1);
    assert_eq!(evaluations[0].evaluation_date, date(2024, 6, 28));
    assert_eq!(evaluations[0].records, 3);
    assert_eq!(evaluations[0].last_date, date(2024, 6, 28));
}
