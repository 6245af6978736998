//! Error types for tern-core.

use crate::runtime::RuntimeKind;
use tern_daytona::DaytonaError;
use thiserror::Error;

/// Result type alias for tern-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur during provider and runtime operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Required configuration is missing or invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// Runtime name is not one of the registered providers
    #[error("unknown runtime '{name}', expected one of: {available}")]
    UnknownRuntime {
        /// The rejected name
        name: String,
        /// Comma-separated registered names
        available: String,
    },

    /// Runtime is registered but not configured well enough to use
    #[error("runtime '{0}' is not properly configured")]
    InvalidRuntime(RuntimeKind),

    /// Sandbox not found
    #[error("sandbox not found: {0}")]
    NotFound(String),

    /// Handle was issued by a different provider
    #[error("handle belongs to runtime '{actual}', not '{expected}'")]
    ForeignHandle {
        /// Runtime of the provider receiving the handle
        expected: RuntimeKind,
        /// Runtime recorded in the handle
        actual: RuntimeKind,
    },

    /// Remote backend call failed
    #[error("backend error: {0}")]
    Backend(#[source] DaytonaError),

    /// New sandbox failed or did not reach `started` in time
    #[error("sandbox {sandbox_id} did not become ready (last state: {state})")]
    NotReady {
        /// Sandbox that was waited on
        sandbox_id: String,
        /// Last state the control plane reported
        state: String,
    },

    /// Supervisor bootstrap failed; the sandbox cannot run commands
    #[error("bootstrap failed for sandbox {sandbox_id}: {source}")]
    Bootstrap {
        /// Sandbox that failed to bootstrap
        sandbox_id: String,
        /// Underlying backend failure
        #[source]
        source: DaytonaError,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DaytonaError> for CoreError {
    fn from(err: DaytonaError) -> Self {
        match err {
            DaytonaError::NotFound(id) => Self::NotFound(id),
            DaytonaError::Config(msg) => Self::Config(msg),
            other => Self::Backend(other),
        }
    }
}
