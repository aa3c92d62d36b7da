//! Rate limiter implementation using governor and Tokio Semaphore.
//!
//! Request quotas use governor's GCRA limiter; the concurrent request cap
//! uses a Tokio semaphore.

use crate::RateLimitConfig;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use heroes_error::{HeroesResult, TransportError, TransportErrorKind};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Rate limiter that enforces per-minute, per-day and concurrency limits.
#[derive(Clone)]
pub struct RateLimiter {
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
    rpd_limiter: Option<Arc<DirectRateLimiter>>,
    concurrent_semaphore: Arc<Semaphore>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("rpm", &self.rpm_limiter.is_some())
            .field("rpd", &self.rpd_limiter.is_some())
            .field(
                "available_permits",
                &self.concurrent_semaphore.available_permits(),
            )
            .finish()
    }
}

impl RateLimiter {
    /// Create a limiter enforcing every non-`None` limit in `config`.
    pub fn new(config: &RateLimitConfig) -> Self {
        let rpm_limiter = (*config.rpm()).and_then(NonZeroU32::new).map(|n| {
            let quota = Quota::per_minute(n);
            Arc::new(GovernorRateLimiter::direct(quota))
        });

        // Spread the daily quota evenly but allow the whole day as a burst
        let rpd_limiter = (*config.rpd()).and_then(NonZeroU32::new).and_then(|n| {
            let period = Duration::from_secs((SECONDS_PER_DAY / u64::from(n.get())).max(1));
            Quota::with_period(period)
                .map(|quota| Arc::new(GovernorRateLimiter::direct(quota.allow_burst(n))))
        });

        let max_concurrent = (*config.max_concurrent())
            .map(|n| n.max(1) as usize)
            .unwrap_or(Semaphore::MAX_PERMITS);
        let concurrent_semaphore = Arc::new(Semaphore::new(max_concurrent));

        Self {
            rpm_limiter,
            rpd_limiter,
            concurrent_semaphore,
        }
    }

    /// Wait until every limit allows one more request.
    ///
    /// Returns a guard that releases the concurrent slot when dropped.
    pub async fn acquire(&self) -> HeroesResult<RateLimiterGuard> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }

        if let Some(limiter) = &self.rpd_limiter {
            limiter.until_ready().await;
        }

        // Acquire concurrent slot last to avoid holding it while waiting
        let permit = self
            .concurrent_semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| {
                TransportError::new(
                    TransportErrorKind::Other,
                    format!("Rate limiter closed: {}", e),
                )
            })?;

        Ok(RateLimiterGuard { _permit: permit })
    }

    /// Try to acquire without waiting; `None` if any limit would block.
    pub fn try_acquire(&self) -> Option<RateLimiterGuard> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.check().ok()?;
        }

        if let Some(limiter) = &self.rpd_limiter {
            limiter.check().ok()?;
        }

        let permit = self.concurrent_semaphore.clone().try_acquire_owned().ok()?;

        Some(RateLimiterGuard { _permit: permit })
    }
}

/// Holds one concurrent request slot until dropped.
#[derive(Debug)]
pub struct RateLimiterGuard {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_concurrency_limit_blocks_second_request() {
        let config = RateLimitConfig::builder()
            .max_concurrent(Some(1))
            .build()
            .unwrap();
        let limiter = RateLimiter::new(&config);

        let guard = limiter.acquire().await.unwrap();
        assert!(limiter.try_acquire().is_none());
        drop(guard);
        assert!(limiter.try_acquire().is_some());
    }

    #[test]
    fn test_rpm_limit_allows_one_burst_request() {
        let config = RateLimitConfig::builder().rpm(Some(1)).build().unwrap();
        let limiter = RateLimiter::new(&config);

        assert!(limiter.try_acquire().is_some());
        assert!(limiter.try_acquire().is_none());
    }

    #[test]
    fn test_unlimited_never_blocks() {
        let limiter = RateLimiter::new(&RateLimitConfig::unlimited());
        let guards: Vec<_> = (0..50).filter_map(|_| limiter.try_acquire()).collect();
        assert_eq!(guards.len(), 50);
    }

    #[test]
    fn test_daily_quota_allows_full_burst() {
        let config = RateLimitConfig::builder().rpd(Some(3)).build().unwrap();
        let limiter = RateLimiter::new(&config);
        let guards: Vec<_> = (0..4).filter_map(|_| limiter.try_acquire()).collect();
        assert_eq!(guards.len(), 3);
    }
}
