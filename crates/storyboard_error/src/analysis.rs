//! Script analysis error types.

/// Failure conditions for the script analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum AnalysisErrorKind {
    /// API key not configured
    #[display("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    /// Script text was empty
    #[display("Script is empty")]
    EmptyScript,
    /// Request could not be sent or the response body could not be read
    #[display("Analysis request failed: {}", _0)]
    Request(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Error message (usually the response body)
        message: String,
    },
    /// Model output could not be parsed as JSON
    #[display("Failed to parse analysis output: {}", _0)]
    Parse(String),
    /// Model output parsed but did not match the scene schema
    #[display("Analysis output does not match scene schema: {}", _0)]
    Schema(String),
    /// Model returned no scenes
    #[display("Analysis produced no scenes")]
    NoScenes,
}

/// Script analysis error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Analysis Error: {} at line {} in {}", kind, line, file)]
pub struct AnalysisError {
    /// The kind of error that occurred
    pub kind: AnalysisErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl AnalysisError {
    /// Create a new AnalysisError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AnalysisErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
