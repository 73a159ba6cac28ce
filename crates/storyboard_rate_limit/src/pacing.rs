//! Spacing between consecutive queue items.

use crate::Sleeper;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Fixed delay inserted between two consecutive items of a batch.
///
/// The limiter only waits; deciding when not to wait (after the last item,
/// after a stop request) is up to the caller.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    delay: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl RateLimiter {
    /// Create a limiter with an explicit delay.
    pub fn new(delay: Duration, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { delay, sleeper }
    }

    /// Create a limiter that keeps a batch under `rpm` requests per minute.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::num::NonZeroU32;
    /// use std::sync::Arc;
    /// use std::time::Duration;
    /// use storyboard_rate_limit::{RateLimiter, TokioSleeper};
    ///
    /// let limiter = RateLimiter::from_rpm(NonZeroU32::new(10).unwrap(), Arc::new(TokioSleeper));
    /// assert_eq!(limiter.delay(), Duration::from_secs(6));
    /// ```
    pub fn from_rpm(rpm: NonZeroU32, sleeper: Arc<dyn Sleeper>) -> Self {
        let delay = Duration::from_millis(60_000 / u64::from(rpm.get()));
        Self::new(delay, sleeper)
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait for the configured delay.
    pub async fn wait(&self) {
        debug!(delay_ms = self.delay.as_millis() as u64, "Pacing before next item");
        self.sleeper.sleep(self.delay).await;
    }
}
