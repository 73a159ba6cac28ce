//! Top-level error wrapper types.

use crate::{
    AnalysisError, ConfigError, GenerationError, JsonError, ProviderError, QueueError, StorageError,
};

/// Every error condition the storyboard engine can surface.
///
/// # Examples
///
/// ```
/// use storyboard_error::{StoryboardError, StoryboardErrorKind, JsonError};
///
/// let err: StoryboardError = JsonError::new("Unexpected token").into();
/// assert!(matches!(err.kind(), StoryboardErrorKind::Json(_)));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StoryboardErrorKind {
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Artifact storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Single image provider error
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Script analysis error
    #[from(AnalysisError)]
    Analysis(AnalysisError),
    /// Classified provider chain failure
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Queue processor error
    #[from(QueueError)]
    Queue(QueueError),
}

/// Storyboard error with kind discrimination.
///
/// # Examples
///
/// ```
/// use storyboard_error::{StoryboardResult, ConfigError};
///
/// fn might_fail() -> StoryboardResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Storyboard Error: {}", _0)]
pub struct StoryboardError(Box<StoryboardErrorKind>);

impl StoryboardError {
    /// Create a new error from a kind.
    pub fn new(kind: StoryboardErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoryboardErrorKind {
        &self.0
    }
}

impl<T> From<T> for StoryboardError
where
    T: Into<StoryboardErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for storyboard operations.
pub type StoryboardResult<T> = std::result::Result<T, StoryboardError>;
