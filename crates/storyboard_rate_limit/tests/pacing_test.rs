//! Tests for inter-item pacing and the per-provider quota.

use async_trait::async_trait;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storyboard_rate_limit::{ProviderQuota, RateLimiter, Sleeper};

#[derive(Debug, Default)]
struct RecordingSleeper {
    calls: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.calls.lock().unwrap().push(duration);
    }
}

#[tokio::test]
async fn test_wait_uses_configured_delay() {
    let sleeper = Arc::new(RecordingSleeper::default());
    let limiter = RateLimiter::new(Duration::from_millis(6000), sleeper.clone());

    limiter.wait().await;
    limiter.wait().await;

    assert_eq!(
        *sleeper.calls.lock().unwrap(),
        vec![Duration::from_millis(6000); 2]
    );
}

#[test]
fn test_delay_from_rpm() {
    let limiter = RateLimiter::from_rpm(
        NonZeroU32::new(30).unwrap(),
        Arc::new(RecordingSleeper::default()),
    );
    assert_eq!(limiter.delay(), Duration::from_secs(2));
}

#[test]
fn test_quota_allows_burst_then_refuses() {
    let quota = ProviderQuota::per_minute(NonZeroU32::new(2).unwrap());
    assert!(quota.try_acquire());
    assert!(quota.try_acquire());
    assert!(!quota.try_acquire());
}

#[tokio::test]
async fn test_quota_clones_share_bucket() {
    let quota = ProviderQuota::per_minute(NonZeroU32::new(1).unwrap());
    let clone = quota.clone();
    quota.until_ready().await;
    assert!(!clone.try_acquire());
    assert_eq!(clone.rpm().get(), 1);
}
