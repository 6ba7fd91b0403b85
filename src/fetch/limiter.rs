//! Token-bucket admission gate for provider fetches.
//!
//! One limiter guards one batch. Admission happens in two stages: a fair
//! semaphore caps how many fetches are in flight, then the token bucket
//! assigns each admitted fetch a dispatch time. The bucket holds `ceiling`
//! tokens and refills completely every interval; dispatch times are spaced
//! at least `min_spacing` apart so a full bucket does not burst out in one
//! instant. Both structures together keep the dispatch rate under the
//! provider quota over any rolling window.

use std::time::Duration;

use tokio::sync::{Mutex, Semaphore, SemaphorePermit};
use tokio::time::Instant;

use super::{FetchResult, Quota};

/// Admission gate enforcing a provider quota.
#[derive(Debug)]
pub struct RateLimiter {
    inflight: Semaphore,
    bucket: Mutex<Bucket>,
    ceiling: u32,
    interval: Duration,
    spacing: Duration,
}

#[derive(Debug)]
struct Bucket {
    tokens: u32,
    refill_at: Instant,
    next_dispatch: Instant,
}

impl RateLimiter {
    /// Builds a limiter for the given quota.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidQuota`] when the quota cannot admit a
    /// single request.
    pub fn new(quota: Quota) -> FetchResult<Self> {
        quota.validate()?;

        let ceiling = quota.ceiling();
        let interval = Duration::from_secs(1);
        let now = Instant::now();

        Ok(Self {
            inflight: Semaphore::new(ceiling as usize),
            bucket: Mutex::new(Bucket {
                tokens: ceiling,
                refill_at: now + interval,
                next_dispatch: now,
            }),
            ceiling,
            interval,
            spacing: quota.min_spacing(),
        })
    }

    /// Requests admitted per second; also the in-flight cap.
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Waits for an in-flight slot and a bucket token, then sleeps until the
    /// assigned dispatch time. The returned permit holds the slot; drop it
    /// when the fetch completes.
    pub async fn acquire(&self) -> RatePermit<'_> {
        let permit = self
            .inflight
            .acquire()
            .await
            .expect("in-flight semaphore is never closed");

        let dispatch_at = self.reserve_slot().await;
        tokio::time::sleep_until(dispatch_at).await;

        RatePermit { _permit: permit }
    }

    /// Takes a token, waiting for the next refill when the bucket is empty,
    /// and assigns the caller a spaced dispatch time.
    async fn reserve_slot(&self) -> Instant {
        loop {
            let refill_at = {
                let mut bucket = self.bucket.lock().await;
                let now = Instant::now();

                if now >= bucket.refill_at {
                    bucket.tokens = self.ceiling;
                    while bucket.refill_at <= now {
                        bucket.refill_at += self.interval;
                    }
                }

                if bucket.tokens > 0 {
                    bucket.tokens -= 1;
                    let at = bucket.next_dispatch.max(now);
                    bucket.next_dispatch = at + self.spacing;
                    return at;
                }

                bucket.refill_at
            };

            tokio::time::sleep_until(refill_at).await;
        }
    }
}

/// Holds one in-flight slot until dropped.
pub struct RatePermit<'a> {
    _permit: SemaphorePermit<'a>,
}
