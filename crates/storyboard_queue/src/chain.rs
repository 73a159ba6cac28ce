//! Ordered provider fallback.

use crate::FailureClassifier;
use std::sync::Arc;
use storyboard_core::ImageArtifact;
use storyboard_error::{GenerationError, GenerationErrorKind, ProviderError, QueueError, QueueErrorKind};
use storyboard_interface::ImageProvider;
use storyboard_rate_limit::{RetryFailure, RetryPolicy, Sleeper};
use tracing::{debug, instrument, warn};

/// One provider and the retry policy that wraps it.
#[derive(Clone)]
pub struct ProviderEntry {
    provider: Arc<dyn ImageProvider>,
    policy: RetryPolicy,
}

impl ProviderEntry {
    /// Create an entry.
    pub fn new(provider: Arc<dyn ImageProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Provider name.
    pub fn name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl std::fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("provider", &self.name())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Progress inside a single chain call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEvent {
    /// A provider is being called again after a transient failure.
    Retrying {
        /// Provider name
        provider: String,
        /// Attempt number, starting at 2
        attempt: u32,
        /// Backoff waited before this attempt
        delay_ms: u64,
    },
    /// A provider gave up; the chain moves on if another provider remains.
    ProviderFailed {
        /// Provider name
        provider: String,
        /// Attempts made against this provider
        attempts: u32,
        /// True if the retry budget ran out, false for a fatal error
        exhausted: bool,
        /// Last error text
        message: String,
    },
}

/// Image providers tried in priority order.
///
/// Each provider gets a full retry budget. The chain returns the first
/// success; later providers are never called. When every provider fails, the
/// last provider's error is classified into a [`GenerationError`].
#[derive(Debug, Clone)]
pub struct ProviderChain {
    entries: Vec<ProviderEntry>,
    classifier: FailureClassifier,
    sleeper: Arc<dyn Sleeper>,
}

impl ProviderChain {
    /// Create a chain.
    ///
    /// # Errors
    ///
    /// Fails with [`QueueErrorKind::NoProviders`] if `entries` is empty.
    pub fn new(
        entries: Vec<ProviderEntry>,
        classifier: FailureClassifier,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, QueueError> {
        if entries.is_empty() {
            return Err(QueueError::new(QueueErrorKind::NoProviders));
        }
        Ok(Self {
            entries,
            classifier,
            sleeper,
        })
    }

    /// Provider names in priority order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(ProviderEntry::name).collect()
    }

    /// Generate an image without progress reporting.
    pub async fn generate(&self, prompt: &str) -> Result<ImageArtifact, GenerationError> {
        self.generate_observed(prompt, &|_: ChainEvent| {}).await
    }

    /// Generate an image, reporting retries and fallthrough to `observer`.
    #[instrument(skip_all, fields(providers = self.entries.len(), prompt_len = prompt.len()))]
    pub async fn generate_observed(
        &self,
        prompt: &str,
        observer: &(dyn Fn(ChainEvent) + Send + Sync),
    ) -> Result<ImageArtifact, GenerationError> {
        let mut last_failure: Option<(&str, RetryFailure<ProviderError>)> = None;

        for entry in &self.entries {
            let name = entry.name();
            let provider = entry.provider.as_ref();
            let schedule = entry.policy.schedule();
            let mut attempt = 0u32;

            let result = entry
                .policy
                .execute(self.sleeper.as_ref(), move || {
                    attempt += 1;
                    if attempt > 1 {
                        let delay = schedule
                            .get(attempt as usize - 2)
                            .copied()
                            .unwrap_or_default();
                        observer(ChainEvent::Retrying {
                            provider: name.to_string(),
                            attempt,
                            delay_ms: delay.as_millis() as u64,
                        });
                    }
                    provider.generate(prompt)
                })
                .await;

            match result {
                Ok(artifact) => {
                    debug!(provider = name, "Provider produced an image");
                    return Ok(artifact);
                }
                Err(failure) => {
                    warn!(
                        provider = name,
                        attempts = failure.attempts(),
                        exhausted = failure.is_exhausted(),
                        "Provider failed: {}",
                        failure.error()
                    );
                    observer(ChainEvent::ProviderFailed {
                        provider: name.to_string(),
                        attempts: failure.attempts(),
                        exhausted: failure.is_exhausted(),
                        message: failure.error().kind.to_string(),
                    });
                    last_failure = Some((name, failure));
                }
            }
        }

        Err(match last_failure {
            Some((provider, failure)) => self.classifier.classify(provider, &failure),
            None => GenerationError::new(
                GenerationErrorKind::Generic,
                "",
                "no providers configured",
            ),
        })
    }
}
