//! Collaborator wiring for the impetu CLI.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use impetu_combine::{RankingWeights, SignalWeights};
use impetu_engine::{EngineConfig, Recomputer, Trigger};
use impetu_fmp::FmpClient;
use impetu_store::{DatabaseConfig, PgStore};
use impetu_traits::Horizon;
use tracing::info;

/// Load the engine configuration, falling back to defaults.
pub(crate) fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let config = EngineConfig::load(path)?;
            info!(path = %path.display(), "loaded engine config");
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

/// Connect to PostgreSQL from `DATABASE_URL` and apply migrations.
pub(crate) async fn connect_store() -> Result<Arc<PgStore>> {
    let config = DatabaseConfig::from_env()?;
    let store = PgStore::connect(&config)
        .await
        .context("connecting to the database")?;
    store.migrate().await.context("applying migrations")?;
    Ok(Arc::new(store))
}

/// Build a trigger over PostgreSQL prices and records and FMP fundamentals.
pub(crate) async fn build_trigger(config_path: Option<&Path>) -> Result<Trigger> {
    let config = load_config(config_path)?;
    let store = connect_store().await?;
    let fundamentals = Arc::new(FmpClient::from_env().context("creating the FMP client")?);

    let recomputer = Recomputer::new(config, store.clone(), fundamentals, store)?;
    Ok(Trigger::new(Arc::new(recomputer)))
}

/// Build ranking weights from a horizon name and optional weight list.
///
/// The list order is return, sortino, rsi, growth, leverage, valuation.
pub(crate) fn ranking_weights(horizon: &str, weights: Option<&[f64]>) -> Result<RankingWeights> {
    let horizon: Horizon = horizon.parse()?;
    let weights = match weights {
        None => RankingWeights::default().weights,
        Some(&[return_rate, sortino_ratio, rsi, revenue_growth, debt_to_equity, price_to_book]) => {
            SignalWeights {
                return_rate,
                sortino_ratio,
                rsi,
                revenue_growth,
                debt_to_equity,
                price_to_book,
            }
        }
        Some(other) => bail!("expected 6 weights, got {}", other.len()),
    };
    Ok(RankingWeights { horizon, weights })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking_weights() {
        let default = ranking_weights("6M", None).unwrap();
        assert_eq!(default.horizon, Horizon::SixMonths);

        let custom = ranking_weights("1m", Some(&[2.0, 1.0, 0.0, 0.5, 0.5, 0.0])).unwrap();
        assert_eq!(custom.horizon, Horizon::OneMonth);
        assert_eq!(custom.weights.return_rate, 2.0);
        assert_eq!(custom.weights.price_to_book, 0.0);

        assert!(ranking_weights("6M", Some(&[1.0, 1.0])).is_err());
        assert!(ranking_weights("12M", None).is_err());
    }

    #[test]
    fn test_load_default_config() {
        let config = load_config(None).unwrap();
        assert_eq!(config.max_concurrency, 8);
    }
}
