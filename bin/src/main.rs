//! impetu CLI binary.
//!
//! Provides a command-line interface for the impetu momentum engine.

mod cmd;
mod data;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "impetu")]
#[command(about = "Multi-horizon momentum scoring for equities", long_about = None)]
#[command(version)]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute and store the cross-section for an evaluation date
    Compute {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End date and evaluation date (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Rank a stored evaluation date with caller weights
    Rank {
        /// Evaluation date (YYYY-MM-DD)
        date: String,

        /// Horizon whose return and Sortino are ranked (1M, 3M, 6M)
        #[arg(short = 'H', long, default_value = "6M")]
        horizon: String,

        /// Weights for return, sortino, rsi, growth, leverage, valuation
        #[arg(short, long, value_delimiter = ',', num_args = 6)]
        weights: Option<Vec<f64>>,

        /// Show only the first N records
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List stored evaluation dates
    Dates,

    /// List the signals that feed the score
    Signals {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("impetu={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Compute { start, end, format } => {
            cmd::compute::run_compute(cli.config.as_deref(), &start, &end, &format).await?;
        }
        Commands::Rank {
            date,
            horizon,
            weights,
            limit,
            format,
        } => {
            cmd::rank::run_rank(
                cli.config.as_deref(),
                &date,
                &horizon,
                weights.as_deref(),
                limit,
                &format,
            )
            .await?;
        }
        Commands::Dates => {
            cmd::dates::list_dates(cli.config.as_deref()).await?;
        }
        Commands::Signals { category, verbose } => {
            cmd::signals::list_signals(category, verbose);
        }
    }

    Ok(())
}
