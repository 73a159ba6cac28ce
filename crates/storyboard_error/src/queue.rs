//! Queue processor error types.

/// Queue processor error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum QueueErrorKind {
    /// A batch is already running
    #[display("A generation batch is already active")]
    BatchActive,
    /// Scene id not present in the storyboard
    #[display("Unknown scene id: {}", _0)]
    UnknownScene(u32),
    /// The target list was empty
    #[display("No scenes to generate")]
    NoTargets,
    /// Provider chain has no entries
    #[display("Provider chain has no providers")]
    NoProviders,
}

/// Queue processor error with location tracking.
///
/// # Examples
///
/// ```
/// use storyboard_error::{QueueError, QueueErrorKind};
///
/// let err = QueueError::new(QueueErrorKind::BatchActive);
/// assert!(format!("{}", err).contains("already active"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Queue Error: {} at line {} in {}", kind, line, file)]
pub struct QueueError {
    /// The specific error kind
    pub kind: QueueErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// Source file where error occurred
    pub file: &'static str,
}

impl QueueError {
    /// Create a new queue error.
    #[track_caller]
    pub fn new(kind: QueueErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
