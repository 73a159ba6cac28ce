//! Per-provider request quota.

use governor::{
    Quota, RateLimiter as GovernorLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

type DirectLimiter = GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Requests-per-minute guard for a single provider.
///
/// Cloning shares the underlying bucket, so every clone draws from the same
/// quota.
#[derive(Clone)]
pub struct ProviderQuota {
    limiter: Arc<DirectLimiter>,
    rpm: NonZeroU32,
}

impl ProviderQuota {
    /// Allow `rpm` requests per minute.
    pub fn per_minute(rpm: NonZeroU32) -> Self {
        Self {
            limiter: Arc::new(GovernorLimiter::direct(Quota::per_minute(rpm))),
            rpm,
        }
    }

    /// Configured requests per minute.
    pub fn rpm(&self) -> NonZeroU32 {
        self.rpm
    }

    /// Wait until a request is permitted.
    pub async fn until_ready(&self) {
        if self.limiter.check().is_err() {
            debug!(rpm = self.rpm.get(), "Provider quota reached, waiting");
            self.limiter.until_ready().await;
        }
    }

    /// Take a permit without waiting. Returns false if none is available.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for ProviderQuota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderQuota").field("rpm", &self.rpm).finish()
    }
}
