//! Final, classified failure of a provider chain.

/// Terminal failure categories surfaced to the user.
///
/// The Display text of each kind is the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GenerationErrorKind {
    /// The request itself was rejected (safety filter or validation)
    #[display("The image request was rejected by the provider's safety or validation checks. Try rewording the scene.")]
    Safety,
    /// The credentials lack access to the image models
    #[display("The API key does not have permission to use the image generation models.")]
    Permission,
    /// Quota or rate limits stayed exhausted on every provider
    #[display("Image generation quota is exhausted on every provider. Wait a while and retry.")]
    Quota,
    /// Anything else
    #[display("Image generation failed.")]
    Generic,
}

/// Classified failure of the whole provider chain.
///
/// Carries the name of the last provider tried and that provider's final
/// error text.
///
/// # Examples
///
/// ```
/// use storyboard_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::Quota, "imagen-3", "HTTP 429 error");
/// assert!(err.user_message().contains("quota"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} (last provider {}: {}) at line {} in {}", kind, provider, detail, line, file)]
pub struct GenerationError {
    /// Failure category
    pub kind: GenerationErrorKind,
    /// Name of the last provider attempted
    pub provider: String,
    /// Final error text of the last provider
    pub detail: String,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(
        kind: GenerationErrorKind,
        provider: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            provider: provider.into(),
            detail: detail.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Message suitable for a scene's `errorMsg`.
    ///
    /// Generic failures append the provider's error text since there is no
    /// better explanation to offer.
    pub fn user_message(&self) -> String {
        match self.kind {
            GenerationErrorKind::Generic => format!("{} {}", self.kind, self.detail),
            _ => self.kind.to_string(),
        }
    }
}
