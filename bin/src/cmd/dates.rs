//! Evaluation date listing command implementation.

use std::path::Path;

use anyhow::Result;
use impetu_traits::RecordStore;

use crate::data;

/// List stored evaluation dates, newest first.
pub(crate) async fn list_dates(config: Option<&Path>) -> Result<()> {
    data::load_config(config)?;
    let store = data::connect_store().await?;
    let evaluations = store.list_evaluations().await?;

    if evaluations.is_empty() {
        println!("No evaluation dates stored.");
        return Ok(());
    }

    println!("{:12} {:>8}  {:12} {:12}", "Evaluation", "Records", "First bar", "Last bar");
    println!("{}", "-".repeat(48));
    for summary in &evaluations {
        println!(
            "{:12} {:>8}  {:12} {:12}",
            summary.evaluation_date.to_string(),
            summary.records,
            summary.first_date.to_string(),
            summary.last_date.to_string()
        );
    }

    Ok(())
}
