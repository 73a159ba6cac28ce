//! Transient failure detection.

use storyboard_error::RetryableError;

/// Signals that mark a failure as transient when no other signals are configured.
pub const DEFAULT_RETRY_SIGNALS: &[&str] = &[
    "408",
    "429",
    "500",
    "502",
    "503",
    "504",
    "quota",
    "resource exhausted",
    "resource_exhausted",
    "rate limit",
    "overloaded",
    "unavailable",
];

/// A configured list of failure signals.
///
/// A signal made only of digits is an HTTP status code and matches the
/// error's structured status, never its text. Any other signal is a phrase
/// matched case-insensitively against the error text.
///
/// # Examples
///
/// ```
/// use storyboard_rate_limit::SignalSet;
///
/// let signals = SignalSet::new(["429", "Quota"]);
/// assert_eq!(signals.status_codes(), [429]);
/// assert!(signals.matches(Some(429), "Too Many Requests"));
/// assert!(signals.matches(Some(400), "daily QUOTA reached"));
/// assert!(!signals.matches(Some(400), "seed 14290 out of range"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalSet {
    status_codes: Vec<u16>,
    phrases: Vec<String>,
}

impl SignalSet {
    /// Split raw signals into status codes and lowercased phrases. Blank signals are dropped.
    pub fn new<I, S>(signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for signal in signals {
            let signal = signal.into().trim().to_lowercase();
            if signal.is_empty() {
                continue;
            }
            let numeric = signal.bytes().all(|b| b.is_ascii_digit());
            match signal.parse::<u16>() {
                Ok(code) if numeric => set.status_codes.push(code),
                _ => set.phrases.push(signal),
            }
        }
        set
    }

    /// Status-code signals.
    pub fn status_codes(&self) -> &[u16] {
        &self.status_codes
    }

    /// Phrase signals, lowercased.
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// True if `text` contains any phrase signal.
    pub fn matches_text(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.phrases.iter().any(|phrase| text.contains(phrase.as_str()))
    }

    /// True if the status is a configured code or the text contains a phrase.
    pub fn matches(&self, status_code: Option<u16>, text: &str) -> bool {
        status_code.is_some_and(|code| self.status_codes.contains(&code)) || self.matches_text(text)
    }

    /// [`SignalSet::matches`] applied to an error.
    pub fn matches_error<E: RetryableError>(&self, error: &E) -> bool {
        self.matches(error.status_code(), &error.signal_text())
    }
}

/// Decides whether a failed call is worth repeating.
///
/// A failure is retryable when its HTTP status is one of the configured codes
/// or its text contains one of the configured phrases.
///
/// # Examples
///
/// ```
/// use storyboard_rate_limit::RetryClassifier;
///
/// let classifier = RetryClassifier::new(["quota"]);
/// assert!(classifier.matches_text("Quota exceeded for project"));
/// assert!(!classifier.matches_text("invalid argument"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryClassifier {
    signals: SignalSet,
}

impl RetryClassifier {
    /// Create a classifier from a list of signals.
    pub fn new<I, S>(signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            signals: SignalSet::new(signals),
        }
    }

    /// Configured signals.
    pub fn signals(&self) -> &SignalSet {
        &self.signals
    }

    /// True if `text` contains any configured phrase.
    pub fn matches_text(&self, text: &str) -> bool {
        self.signals.matches_text(text)
    }

    /// True if `error` should be retried.
    pub fn is_retryable<E: RetryableError>(&self, error: &E) -> bool {
        self.signals.matches_error(error)
    }
}

impl Default for RetryClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_SIGNALS.iter().copied())
    }
}
