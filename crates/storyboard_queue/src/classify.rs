//! Mapping a chain's last error to a user-facing category.

use storyboard_error::{
    GenerationError, GenerationErrorKind, ProviderError, ProviderErrorKind, RetryableError,
};
use storyboard_rate_limit::{FailureSignals, RetryFailure, SignalSet};

/// Classifies the final error of a failed provider chain.
///
/// Checks run in this order, first match wins:
/// 1. a block reported by the provider is Safety; HTTP 401/403 is Permission
/// 2. permission signals
/// 3. safety signals
/// 4. retries exhausted, or quota signals
/// 5. anything else is generic
///
/// Permission is checked before the safety signals because Gemini reports an
/// invalid key as `400 INVALID_ARGUMENT`. Status-code signals only match the
/// response status, so numbers in an error body never change the category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureClassifier {
    safety: SignalSet,
    permission: SignalSet,
    quota: SignalSet,
}

impl FailureClassifier {
    /// Build a classifier from configured signals. Phrase matching is case-insensitive.
    pub fn new(signals: &FailureSignals) -> Self {
        Self {
            safety: SignalSet::new(signals.safety_signals.iter().cloned()),
            permission: SignalSet::new(signals.permission_signals.iter().cloned()),
            quota: SignalSet::new(signals.quota_signals.iter().cloned()),
        }
    }

    /// Category for a provider's final failure.
    pub fn kind_of(&self, failure: &RetryFailure<ProviderError>) -> GenerationErrorKind {
        let error = failure.error();
        match &error.kind {
            ProviderErrorKind::Blocked(_) => return GenerationErrorKind::Safety,
            ProviderErrorKind::HttpError {
                status_code: 401 | 403,
                ..
            } => return GenerationErrorKind::Permission,
            _ => {}
        }

        if self.permission.matches_error(error) {
            GenerationErrorKind::Permission
        } else if self.safety.matches_error(error) {
            GenerationErrorKind::Safety
        } else if failure.is_exhausted() || self.quota.matches_error(error) {
            GenerationErrorKind::Quota
        } else {
            GenerationErrorKind::Generic
        }
    }

    /// Build the chain's error from the last provider's failure.
    #[track_caller]
    pub fn classify(&self, provider: &str, failure: &RetryFailure<ProviderError>) -> GenerationError {
        GenerationError::new(
            self.kind_of(failure),
            provider,
            failure.error().signal_text(),
        )
    }
}

impl Default for FailureClassifier {
    fn default() -> Self {
        Self::new(&FailureSignals::default())
    }
}
