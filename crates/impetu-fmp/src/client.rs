//! FMP API client implementation.

use crate::{
    Result,
    error::FmpError,
    throttle::{RatePolicy, Throttle},
    types::{FinancialGrowth, FinancialRatios, Period},
};
use async_trait::async_trait;
use impetu_traits::{FundamentalsSource, RawFundamentals};
use reqwest::{Client, StatusCode};
use std::env;
use std::time::Duration;
use tracing::{debug, warn};

/// Base URL for the FMP stable API.
const FMP_BASE_URL: &str = "https://financialmodelingprep.com/stable";

/// Per-request timeout for the HTTP client.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

/// Financial Modeling Prep API client.
///
/// All requests are paced by the client's [`Throttle`].
#[derive(Debug, Clone)]
pub struct FmpClient {
    client: Client,
    api_key: String,
    base_url: String,
    throttle: Throttle,
}

impl FmpClient {
    /// Create a new FMP client with the given API key and default pacing.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(REQUEST_TIMEOUT),
            api_key: api_key.into(),
            base_url: FMP_BASE_URL.to_string(),
            throttle: Throttle::default(),
        }
    }

    /// Create a new FMP client from the `FMP_API_KEY` environment variable.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> Result<Self> {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_key = env::var("FMP_API_KEY").map_err(|_| FmpError::MissingApiKey)?;

        Ok(Self::new(api_key))
    }

    /// Replace the request pacing.
    #[must_use]
    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    /// Replace the request pacing from a policy.
    ///
    /// # Errors
    ///
    /// Returns [`FmpError::InvalidPolicy`] if the policy is unusable.
    pub fn with_rate_policy(self, policy: &RatePolicy) -> Result<Self> {
        Ok(self.with_throttle(Throttle::new(policy)?))
    }

    /// Replace the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    /// Point the client at a different API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build a URL with the API key.
    fn url(&self, endpoint: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if endpoint.contains('?') {
            format!("{base}/{endpoint}&apikey={}", self.api_key)
        } else {
            format!("{base}/{endpoint}?apikey={}", self.api_key)
        }
    }

    /// Make a throttled GET request and parse the JSON response.
    ///
    /// A 429 is retried on the throttle's backoff schedule.
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint);
        let mut retry = 0;

        let response = loop {
            self.throttle.until_ready().await;
            let response = self.client.get(&url).send().await?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                break response;
            }
            let Some(delay) = self.throttle.retry_delay(retry) else {
                return Err(FmpError::RateLimitExceeded { retries: retry });
            };
            warn!(
                endpoint,
                retry,
                delay_ms = delay.as_millis() as u64,
                "rate limited, backing off"
            );
            tokio::time::sleep(delay).await;
            retry += 1;
        };

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FmpError::Api(format!("HTTP {status}: {text}")));
        }

        let text = response.text().await?;

        // Check for error responses
        if text.contains("\"Error Message\"") {
            return Err(FmpError::Api(text));
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Get growth figures for a symbol, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn financial_growth(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<FinancialGrowth>> {
        let limit_param = limit.map(|l| format!("&limit={l}")).unwrap_or_default();
        let endpoint = format!(
            "financial-growth?symbol={}&period={}{}",
            symbol.to_uppercase(),
            period.as_str(),
            limit_param
        );
        self.get(&endpoint).await
    }

    /// Get financial ratios for a symbol, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn ratios(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<FinancialRatios>> {
        let limit_param = limit.map(|l| format!("&limit={l}")).unwrap_or_default();
        let endpoint = format!(
            "ratios?symbol={}&period={}{}",
            symbol.to_uppercase(),
            period.as_str(),
            limit_param
        );
        self.get(&endpoint).await
    }

    /// Latest revenue growth, debt-to-equity and price-to-book for a symbol.
    ///
    /// Returns `None` when the provider has no filings for the symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if either request fails.
    pub async fn latest_fundamentals(&self, symbol: &str) -> Result<Option<RawFundamentals>> {
        let (growth, ratios) = tokio::join!(
            self.financial_growth(symbol, Period::Annual, Some(1)),
            self.ratios(symbol, Period::Annual, Some(1)),
        );
        Ok(merge_latest(growth?.first(), ratios?.first()))
    }
}

fn merge_latest(
    growth: Option<&FinancialGrowth>,
    ratios: Option<&FinancialRatios>,
) -> Option<RawFundamentals> {
    if growth.is_none() && ratios.is_none() {
        return None;
    }
    Some(RawFundamentals {
        revenue_growth: growth.and_then(|g| g.revenue_growth),
        debt_to_equity: ratios.and_then(|r| r.debt_to_equity_ratio),
        price_to_book: ratios.and_then(|r| r.price_to_book_ratio),
    })
}

#[async_trait]
impl FundamentalsSource for FmpClient {
    async fn fundamentals(&self, symbol: &str) -> impetu_traits::Result<Option<RawFundamentals>> {
        let fundamentals = self.latest_fundamentals(symbol).await?;
        debug!(symbol, found = fundamentals.is_some(), "fetched fundamentals");
        Ok(fundamentals)
    }
}
