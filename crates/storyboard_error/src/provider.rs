//! Image provider error types and retry classification.

/// Failure conditions for a single image provider call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ProviderErrorKind {
    /// API key not configured
    #[display("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    /// Failed to create HTTP client
    #[display("Failed to create provider client: {}", _0)]
    ClientCreation(String),
    /// Request could not be sent or the response body could not be read
    #[display("Provider request failed: {}", _0)]
    ApiRequest(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Error message (usually the response body)
        message: String,
    },
    /// The provider refused the prompt on safety grounds
    #[display("Request blocked by safety filter: {}", _0)]
    Blocked(String),
    /// Response was well-formed but carried no image
    #[display("No image returned: {}", _0)]
    NoImage(String),
    /// Response body did not match the expected shape
    #[display("Invalid provider response: {}", _0)]
    InvalidResponse(String),
    /// Base64 decoding of inline image data failed
    #[display("Base64 decode error: {}", _0)]
    Base64Decode(String),
}

impl ProviderErrorKind {
    /// HTTP status of the failed response, if the provider answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderErrorKind::HttpError { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Provider error with source location tracking.
///
/// # Examples
///
/// ```
/// use storyboard_error::{ProviderError, ProviderErrorKind, RetryableError};
///
/// let err = ProviderError::new(ProviderErrorKind::HttpError {
///     status_code: 503,
///     message: "The model is overloaded".to_string(),
/// });
/// assert_eq!(err.status_code(), Some(503));
/// assert!(format!("{}", err).contains("503"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {} at line {} in {}", kind, line, file)]
pub struct ProviderError {
    /// The kind of error that occurred
    pub kind: ProviderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new ProviderError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// What a retry or failure classifier can inspect on an error.
///
/// Status codes are matched only against [`RetryableError::status_code`];
/// phrase signals are matched against [`RetryableError::signal_text`]. A
/// number that merely appears in a response body never reads as a status.
pub trait RetryableError {
    /// HTTP status carried by the error, if any.
    fn status_code(&self) -> Option<u16>;

    /// Text matched against configured signals.
    ///
    /// Must not include source locations, so that a line number such as 429
    /// never reads as a status code.
    fn signal_text(&self) -> String;
}

impl RetryableError for ProviderError {
    fn status_code(&self) -> Option<u16> {
        self.kind.status_code()
    }

    fn signal_text(&self) -> String {
        self.kind.to_string()
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
