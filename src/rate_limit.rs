//! Pre-call pacing for the upstream completion API.

use async_trait::async_trait;
use std::time::Duration;

/// Gate awaited before every upstream request.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn acquire(&self);
}

/// Sleeps a flat delay before every call, whatever the upstream rate-limit state.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub const DEFAULT: Duration = Duration::from_secs(5);

    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

#[async_trait]
impl RateLimiter for FixedDelay {
    async fn acquire(&self) {
        tracing::debug!(delay_ms = self.delay.as_millis() as u64, "pre-call delay");
        tokio::time::sleep(self.delay).await;
    }
}

/// No pacing at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl RateLimiter for NoDelay {
    async fn acquire(&self) {}
}

/// Build the limiter for a configured delay; zero disables pacing.
pub fn limiter_for(delay: Duration) -> std::sync::Arc<dyn RateLimiter> {
    if delay.is_zero() {
        std::sync::Arc::new(NoDelay)
    } else {
        std::sync::Arc::new(FixedDelay::new(delay))
    }
}
