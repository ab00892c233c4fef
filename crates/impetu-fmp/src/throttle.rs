//! Request pacing for the fundamentals provider.
//!
//! A [`Throttle`] owns a token bucket built from a [`RatePolicy`]. Every
//! outgoing request waits on the bucket; a 429 response is retried after an
//! exponentially growing delay until the policy's retry budget is spent.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::InMemoryState;
use governor::state::direct::NotKeyed;
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};

use crate::{FmpError, Result};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Exponential backoff applied to rate-limited responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
    /// Delay before the first retry in milliseconds (default: 1000)
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay in milliseconds (default: 30000)
    pub max_delay_ms: u64,
    /// Growth factor between retries (default: 2.0)
    pub multiplier: f64,
    /// Retries before giving up (default: 3)
    pub max_retries: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1_000,
            max_delay_ms: 30_000,
            multiplier: 2.0,
            max_retries: 3,
        }
    }
}

impl BackoffPolicy {
    /// Delay before retry number `retry` (0-based), or `None` once the
    /// budget is spent.
    #[must_use]
    pub fn delay(&self, retry: u32) -> Option<Duration> {
        if retry >= self.max_retries {
            return None;
        }

        let scale = self.multiplier.max(1.0).powf(f64::from(retry));
        let millis = (self.initial_delay_ms as f64 * scale).min(self.max_delay_ms as f64);
        Some(Duration::from_secs_f64(millis / 1_000.0))
    }
}

/// Request budget for the provider.
///
/// The default allows one request per second, which keeps a full universe
/// refresh inside the free tier's burst limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatePolicy {
    /// Length of the quota window in milliseconds (default: 1000)
    pub quota_window_ms: u64,
    /// Requests allowed per window (default: 1)
    pub quota_limit: u32,
    /// Backoff for 429 responses.
    pub backoff: BackoffPolicy,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            quota_window_ms: 1_000,
            quota_limit: 1,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl RatePolicy {
    fn quota(&self) -> Result<Quota> {
        let limit = NonZeroU32::new(self.quota_limit)
            .ok_or_else(|| FmpError::InvalidPolicy("quota_limit must be positive".into()))?;
        if self.quota_window_ms == 0 {
            return Err(FmpError::InvalidPolicy(
                "quota_window_ms must be positive".into(),
            ));
        }

        let per_cell = Duration::from_secs_f64(
            (self.quota_window_ms as f64 / 1_000.0 / f64::from(self.quota_limit)).max(0.001),
        );
        let quota = Quota::with_period(per_cell)
            .ok_or_else(|| FmpError::InvalidPolicy("empty quota period".into()))?;
        Ok(quota.allow_burst(limit))
    }
}

/// Shared token bucket plus backoff schedule.
///
/// Cloning shares the bucket, so every clone draws from the same budget.
#[derive(Clone)]
pub struct Throttle {
    limiter: Arc<DirectRateLimiter>,
    backoff: BackoffPolicy,
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle")
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl Throttle {
    /// Build a throttle from a policy.
    ///
    /// # Errors
    ///
    /// Returns [`FmpError::InvalidPolicy`] for a zero limit or window.
    pub fn new(policy: &RatePolicy) -> Result<Self> {
        Ok(Self {
            limiter: Arc::new(RateLimiter::direct(policy.quota()?)),
            backoff: policy.backoff.clone(),
        })
    }

    /// Wait until the bucket has room for one more request.
    pub async fn until_ready(&self) {
        self.limiter.until_ready().await;
    }

    /// Take a token without waiting; `false` when the bucket is empty.
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Delay before retry number `retry` after a 429.
    #[must_use]
    pub fn retry_delay(&self, retry: u32) -> Option<Duration> {
        self.backoff.delay(retry)
    }

    /// Retries allowed after a 429.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.backoff.max_retries
    }
}

impl Default for Throttle {
    fn default() -> Self {
        let quota = Quota::per_second(NonZeroU32::MIN);
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            backoff: BackoffPolicy::default(),
        }
    }
}
