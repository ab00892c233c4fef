//! Rank command implementation.

use std::path::Path;

use anyhow::{Result, bail};
use impetu_engine::{RankRequest, RankResponse};

use crate::data;

/// Rank the records stored for `date` with caller weights.
pub(crate) async fn run_rank(
    config: Option<&Path>,
    date: &str,
    horizon: &str,
    weights: Option<&[f64]>,
    limit: Option<usize>,
    format: &str,
) -> Result<()> {
    let request = RankRequest {
        evaluation_date: date.to_string(),
        weights: data::ranking_weights(horizon, weights)?,
    };
    let trigger = data::build_trigger(config).await?;

    let mut response = match trigger.rank(&request).await {
        Ok(response) => response,
        Err(e) => bail!("{e} (status {})", e.status_code()),
    };
    if let Some(limit) = limit {
        response.records.truncate(limit);
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response, &request);
    }
    Ok(())
}

fn print_response(response: &RankResponse, request: &RankRequest) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                      Relative Ranking                        ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let horizon = request.weights.horizon;
    println!("Evaluation date: {}", response.evaluation_date);
    println!("Horizon:         {horizon}");
    println!();

    println!(
        "{:>4}  {:8} {:>8} {:>9} {:>8} {:>6}",
        "Rank", "Symbol", "Relative", "Absolute", "Return", "RSI"
    );
    println!("{}", "-".repeat(50));
    for (i, entry) in response.records.iter().enumerate() {
        let record = &entry.record;
        println!(
            "{:>4}  {:8} {:>8.4} {:>9.4} {:>7.2}% {:>6.1}",
            i + 1,
            record.symbol,
            entry.score,
            record.score,
            record.metrics.get(horizon).return_rate * 100.0,
            record.rsi
        );
    }
    println!();

    let summary = &response.summary;
    println!("Ranked: {}", summary.count);
    if let (Some(top), Some(average)) = (summary.top_score, summary.average_score) {
        println!("Top:    {top:.4}");
        println!("Mean:   {average:.4}");
    }
    println!();
}
