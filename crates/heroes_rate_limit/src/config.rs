//! Rate limit configuration.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Request quotas for one backend. `None` means unlimited.
///
/// ```toml
/// [rate_limit]
/// rpm = 10
/// rpd = 250
/// max_concurrent = 1
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Getters, Builder,
)]
#[builder(setter(into))]
pub struct RateLimitConfig {
    /// Requests per minute
    #[builder(default)]
    #[serde(default)]
    rpm: Option<u32>,
    /// Requests per day
    #[builder(default)]
    #[serde(default)]
    rpd: Option<u32>,
    /// Maximum concurrent requests
    #[builder(default)]
    #[serde(default)]
    max_concurrent: Option<u32>,
}

impl RateLimitConfig {
    /// Creates a new builder for `RateLimitConfig`.
    pub fn builder() -> RateLimitConfigBuilder {
        RateLimitConfigBuilder::default()
    }

    /// No limits at all.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Whether any limit is set.
    pub fn is_limited(&self) -> bool {
        self.rpm.is_some() || self.rpd.is_some() || self.max_concurrent.is_some()
    }
}
