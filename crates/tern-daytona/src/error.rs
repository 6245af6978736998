//! Error types for tern-daytona.

use thiserror::Error;

/// Result type alias for tern-daytona operations.
pub type Result<T> = std::result::Result<T, DaytonaError>;

/// Errors that can occur while talking to the Daytona API.
#[derive(Debug, Error)]
pub enum DaytonaError {
    /// Client configuration is missing or malformed
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure (connect, TLS, timeout, body decode)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Sandbox (or toolbox resource) does not exist
    #[error("sandbox not found: {0}")]
    NotFound(String),

    /// Non-success response from the API
    #[error("daytona API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DaytonaError {
    /// Whether this error reports an already-existing resource.
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::Api { status, message } => {
                *status == 409 || message.to_lowercase().contains("already exists")
            }
            _ => false,
        }
    }

    /// Whether this error reports a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_detection() {
        let err = DaytonaError::Api {
            status: 409,
            message: "conflict".into(),
        };
        assert!(err.is_conflict());

        // Some toolbox builds answer 400 with a descriptive message
        let err = DaytonaError::Api {
            status: 400,
            message: "session default already exists".into(),
        };
        assert!(err.is_conflict());

        let err = DaytonaError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert!(!err.is_conflict());
        assert!(!DaytonaError::NotFound("x".into()).is_conflict());
    }

    #[test]
    fn test_not_found_display() {
        let err = DaytonaError::NotFound("sb-1".into());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "sandbox not found: sb-1");
    }
}
