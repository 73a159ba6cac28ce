//! Exponential backoff around a single operation.

use crate::{RetryClassifier, Sleeper};
use derive_getters::Getters;
use std::future::Future;
use std::time::Duration;
use storyboard_error::RetryableError;
use tracing::{debug, warn};

/// Why a retried operation gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryFailure<E> {
    /// The error was not retryable and was returned after the first attempt
    /// that produced it.
    Fatal {
        /// Last error observed
        error: E,
        /// Total attempts made, including the failing one
        attempts: u32,
    },
    /// Every allowed retry was spent on transient errors.
    Exhausted {
        /// Last error observed
        error: E,
        /// Total attempts made, including the failing one
        attempts: u32,
    },
}

impl<E> RetryFailure<E> {
    /// The last error observed.
    pub fn error(&self) -> &E {
        match self {
            Self::Fatal { error, .. } | Self::Exhausted { error, .. } => error,
        }
    }

    /// Consume the failure and return the last error.
    pub fn into_error(self) -> E {
        match self {
            Self::Fatal { error, .. } | Self::Exhausted { error, .. } => error,
        }
    }

    /// Total attempts made.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Fatal { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    /// True if the retry budget ran out on transient errors.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

/// Retry budget and backoff schedule for one provider.
///
/// The first retry waits `base_delay`, and each further retry waits twice as
/// long as the one before. At most `max_retries` retries follow the initial
/// attempt.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use storyboard_rate_limit::{RetryClassifier, RetryPolicy};
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(1000), RetryClassifier::default());
/// assert_eq!(
///     policy.schedule(),
///     vec![
///         Duration::from_millis(1000),
///         Duration::from_millis(2000),
///         Duration::from_millis(4000),
///     ]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    classifier: RetryClassifier,
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(max_retries: u32, base_delay: Duration, classifier: RetryClassifier) -> Self {
        Self {
            max_retries,
            base_delay,
            classifier,
        }
    }

    /// Same budget and schedule with a different classifier.
    pub fn with_classifier(&self, classifier: RetryClassifier) -> Self {
        Self {
            classifier,
            ..self.clone()
        }
    }

    /// The delays that precede each retry, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        let mut delay = self.base_delay;
        (0..self.max_retries)
            .map(|_| {
                let current = delay;
                delay = delay.saturating_mul(2);
                current
            })
            .collect()
    }

    /// Run `operation`, retrying transient failures with exponential backoff.
    ///
    /// Non-retryable errors are returned immediately as
    /// [`RetryFailure::Fatal`]. When the budget runs out the last transient
    /// error is returned as [`RetryFailure::Exhausted`].
    pub async fn execute<T, E, F, Fut>(
        &self,
        sleeper: &dyn Sleeper,
        mut operation: F,
    ) -> Result<T, RetryFailure<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryableError + std::fmt::Display,
    {
        let mut retries_left = self.max_retries;
        let mut delay = self.base_delay;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let error = match operation().await {
                Ok(value) => {
                    if attempts > 1 {
                        debug!(attempts, "Operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !self.classifier.is_retryable(&error) {
                warn!(attempts, "Permanent error, failing immediately: {}", error);
                return Err(RetryFailure::Fatal { error, attempts });
            }

            if retries_left == 0 {
                warn!(attempts, "Retries exhausted: {}", error);
                return Err(RetryFailure::Exhausted { error, attempts });
            }

            warn!(
                attempts,
                delay_ms = delay.as_millis() as u64,
                "Transient error, will retry: {}",
                error
            );
            drop(error);
            sleeper.sleep(delay).await;
            delay = delay.saturating_mul(2);
            retries_left -= 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(2000), RetryClassifier::default())
    }
}
