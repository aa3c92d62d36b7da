//! Rate-limited wrapper around a generation backend.

use crate::{RateLimitConfig, RateLimiter};
use async_trait::async_trait;
use heroes_core::{GenerateRequest, GenerateResponse};
use heroes_error::HeroesResult;
use heroes_interface::GenerationDriver;
use tracing::{debug, instrument};

/// A [`GenerationDriver`] that waits for quota before every call.
///
/// Failures from the inner driver are returned unchanged; nothing is retried.
#[derive(Debug, Clone)]
pub struct RateLimitedDriver<D> {
    inner: D,
    limiter: RateLimiter,
}

impl<D: GenerationDriver> RateLimitedDriver<D> {
    /// Wrap `inner` with the limits in `config`.
    pub fn new(inner: D, config: &RateLimitConfig) -> Self {
        Self {
            inner,
            limiter: RateLimiter::new(config),
        }
    }

    /// The wrapped driver.
    pub fn inner(&self) -> &D {
        &self.inner
    }
}

#[async_trait]
impl<D: GenerationDriver> GenerationDriver for RateLimitedDriver<D> {
    #[instrument(skip(self, req), fields(model = %req.model()))]
    async fn generate(&self, req: &GenerateRequest) -> HeroesResult<GenerateResponse> {
        let _guard = self.limiter.acquire().await?;
        debug!("Rate limit permit acquired");
        self.inner.generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
