//! Rate limiting for generation backends.
//!
//! Wrap any [`GenerationDriver`](heroes_interface::GenerationDriver) in a
//! [`RateLimitedDriver`] to cap requests per minute, requests per day and
//! concurrent requests. The wrapper waits for quota; it never retries.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod driver;
mod limiter;

pub use config::{RateLimitConfig, RateLimitConfigBuilder};
pub use driver::RateLimitedDriver;
pub use limiter::{RateLimiter, RateLimiterGuard};
