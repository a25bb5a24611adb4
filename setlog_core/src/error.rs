//! Error types for the setlog_core library.

use crate::session::SessionState;
use std::fmt;
use std::io;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// A single problem found while validating the ledger at finish time.
///
/// Exercise and set numbers are 1-based, matching what the user sees.
/// An issue with neither applies to the workout as a whole.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationIssue {
    pub exercise: Option<usize>,
    pub set: Option<usize>,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.exercise, self.set) {
            (Some(exercise), Some(set)) => {
                write!(f, "exercise {} set {}: {}", exercise, set, self.message)
            }
            (Some(exercise), None) => write!(f, "exercise {}: {}", exercise, self.message),
            _ => f.write_str(&self.message),
        }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Core error type for setlog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The ledger failed validation at finish time (user-correctable)
    #[error("Workout has invalid entries: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),

    /// The workout store could not accept or remove a workout (retryable)
    #[error("Storage failure: {0}")]
    Storage(String),

    /// No template was staged for the session
    #[error("No active workout found")]
    MissingSession,

    /// No stored workout with this identity
    #[error("Workout {0} not found")]
    NotFound(Uuid),

    /// A finish attempt is already waiting on the store
    #[error("A finish is already in progress")]
    FinishInProgress,

    /// The session no longer accepts this operation
    #[error("Session is {0}")]
    SessionClosed(SessionState),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the user can fix the problem and try the same action again
    /// without losing session data.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_issues() {
        let err = Error::Validation(vec![
            ValidationIssue {
                exercise: Some(1),
                set: Some(2),
                message: "reps \"abc\" is not a number".into(),
            },
            ValidationIssue {
                exercise: Some(3),
                set: None,
                message: "unknown exercise 'x'".into(),
            },
        ]);
        let text = err.to_string();
        assert!(text.contains("exercise 1 set 2: reps \"abc\" is not a number"));
        assert!(text.contains("exercise 3: unknown exercise 'x'"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::Storage("disk full".into()).is_retryable());
        assert!(Error::Validation(vec![]).is_retryable());
        assert!(!Error::MissingSession.is_retryable());
        assert!(!Error::FinishInProgress.is_retryable());
    }
}
