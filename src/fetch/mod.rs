//! Quota-aware batch fetching.
//!
//! Gmail meters API usage in cost units per user per second, and a message
//! fetch has a fixed unit cost. [`Quota`] captures those two numbers;
//! [`fetch_all`] derives the request ceiling from them and pulls an entire
//! batch of ids as fast as the quota allows, returning the messages in
//! input order.
//!
//! The limiter performs no retries of its own. Transient-failure handling
//! belongs to the [`MessageFetcher`] implementation; any error the fetcher
//! returns is final and fails the whole batch.

mod limiter;

pub use limiter::{RateLimiter, RatePermit};

use std::time::Duration;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::gmail::RawMessage;
use crate::providers::{MessageFetcher, ProviderError};

/// Result type alias for batch fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Errors that can occur while fetching a batch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The batch contained no ids.
    #[error("no message ids to fetch")]
    EmptyBatch,

    /// The quota cannot admit even a single request.
    #[error("invalid quota: {0}")]
    InvalidQuota(String),

    /// An individual fetch failed; the batch was abandoned.
    #[error("fetch failed for message {id}: {source}")]
    Message {
        id: String,
        #[source]
        source: ProviderError,
    },
}

/// A provider quota expressed as cost units per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quota {
    /// Units the provider grants per user per second.
    pub units_per_second: u32,
    /// Units one message fetch costs.
    pub unit_cost: u32,
}

impl Default for Quota {
    fn default() -> Self {
        // Gmail grants 250 quota units per user per second and prices
        // messages.get at 5 units.
        Self {
            units_per_second: 250,
            unit_cost: 5,
        }
    }
}

impl Quota {
    /// Whole requests admitted per second; doubles as the in-flight cap.
    pub fn ceiling(&self) -> u32 {
        if self.unit_cost == 0 {
            0
        } else {
            self.units_per_second / self.unit_cost
        }
    }

    /// Minimum spacing between dispatched requests, smoothing bursts inside
    /// a refill interval.
    pub fn min_spacing(&self) -> Duration {
        match u64::from(self.ceiling()) {
            0 => Duration::from_secs(1),
            ceiling => Duration::from_millis((1000 + ceiling / 2) / ceiling),
        }
    }

    /// Checks that the quota can admit at least one request per interval.
    pub fn validate(&self) -> FetchResult<()> {
        if self.unit_cost == 0 {
            return Err(FetchError::InvalidQuota(
                "unit cost must be positive".to_string(),
            ));
        }
        if self.ceiling() == 0 {
            return Err(FetchError::InvalidQuota(format!(
                "{} units per second cannot cover one request costing {}",
                self.units_per_second, self.unit_cost
            )));
        }
        Ok(())
    }
}

/// Fetches every id in `ids` under `quota` and returns the messages in
/// input order.
///
/// Results are matched to ids positionally, regardless of completion order.
/// The first failing fetch fails the whole batch; partial output is never
/// returned. An empty id list or an unusable quota fails fast before any
/// request is dispatched.
pub async fn fetch_all<F>(fetcher: &F, ids: &[String], quota: Quota) -> FetchResult<Vec<RawMessage>>
where
    F: MessageFetcher + ?Sized,
{
    if ids.is_empty() {
        return Err(FetchError::EmptyBatch);
    }
    let limiter = RateLimiter::new(quota)?;

    tracing::debug!(
        count = ids.len(),
        ceiling = limiter.ceiling(),
        "dispatching fetch batch"
    );

    let fetches = ids.iter().map(|id| {
        let limiter = &limiter;
        async move {
            let _permit = limiter.acquire().await;
            fetcher
                .fetch_one(id)
                .await
                .map_err(|source| FetchError::Message {
                    id: id.clone(),
                    source,
                })
        }
    });

    try_join_all(fetches).await
}
