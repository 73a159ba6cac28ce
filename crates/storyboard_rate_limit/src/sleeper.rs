//! Injectable waiting.

use async_trait::async_trait;
use std::time::Duration;

/// Something that can wait for a duration.
///
/// Production code uses [`TokioSleeper`]. Tests substitute an implementation
/// that records the requested durations and returns immediately.
#[async_trait]
pub trait Sleeper: Send + Sync + std::fmt::Debug {
    /// Wait for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
