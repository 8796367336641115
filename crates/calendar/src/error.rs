//! Error types for calendar backends.

use thiserror::Error;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors surfaced by a calendar backend.
///
/// The `Display` text is what tools report back to the host, so messages
/// are written for end users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The process was denied (or never granted) calendar access.
    #[error("Calendar access denied. Grant access in System Settings > Privacy & Security")]
    AccessDenied,

    /// No event with the requested identifier exists.
    #[error("Event not found")]
    NotFound,

    /// The automation script ran but reported a failure.
    #[error("Calendar script failed: {0}")]
    Script(String),

    /// The automation script did not finish in time.
    #[error("Calendar script timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The automation script produced output we could not parse.
    #[error("Unexpected calendar output: {0}")]
    MalformedOutput(String),

    /// The backend cannot be reached at all (missing binary, poisoned store).
    #[error("Calendar backend unavailable: {0}")]
    Unavailable(String),
}
