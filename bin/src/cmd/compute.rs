//! Compute command implementation.

use std::path::Path;

use anyhow::{Result, bail};
use impetu_engine::{ComputeRequest, ComputeResponse};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::data;

/// Recompute and store the cross-section for `end`.
pub(crate) async fn run_compute(
    config: Option<&Path>,
    start: &str,
    end: &str,
    format: &str,
) -> Result<()> {
    let trigger = data::build_trigger(config).await?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling run");
            on_interrupt.cancel();
        }
    });

    let request = ComputeRequest {
        start_date: start.to_string(),
        end_date: end.to_string(),
    };
    let response = match trigger.compute_with_cancel(&request, cancel).await {
        Ok(response) => response,
        Err(e) => bail!("{e} (status {})", e.status_code()),
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }
    Ok(())
}

fn print_response(response: &ComputeResponse) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                      Momentum Scores                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Evaluation date: {}", response.evaluation_date);
    if let Some(message) = &response.message {
        println!("{message}");
    }
    println!();

    if !response.records.is_empty() {
        println!(
            "{:>4}  {:8} {:>7} {:>7} {:>7} {:>7} {:>6}",
            "Rank", "Symbol", "Score", "1M", "3M", "6M", "RSI"
        );
        println!("{}", "-".repeat(52));
        for (i, record) in response.records.iter().enumerate() {
            println!(
                "{:>4}  {:8} {:>7.4} {:>7.4} {:>7.4} {:>7.4} {:>6.1}",
                i + 1,
                record.symbol,
                record.score,
                record.sub_scores.one_month,
                record.sub_scores.three_month,
                record.sub_scores.six_month,
                record.rsi
            );
        }
        println!();
    }

    let summary = &response.summary;
    println!("Records:  {}", summary.count);
    if let (Some(top), Some(average)) = (summary.top_score, summary.average_score) {
        println!("Top:      {top:.4}");
        println!("Average:  {average:.4}");
    }

    if !response.skipped.is_empty() {
        println!("\nSkipped {} instrument(s):", response.skipped.len());
        for skipped in &response.skipped {
            println!("  {:8} {}", skipped.symbol, skipped.reason);
        }
    }
    println!();
}
