//! Wire types returned by the Daytona API.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Lifecycle state reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SandboxState {
    Creating,
    Restoring,
    Starting,
    Started,
    Stopping,
    Stopped,
    Archiving,
    Archived,
    Destroying,
    Destroyed,
    PendingBuild,
    BuildFailed,
    Error,
    /// Any state this client does not know about.
    #[default]
    Unknown,
}

impl SandboxState {
    /// The API's string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creating => "creating",
            Self::Restoring => "restoring",
            Self::Starting => "starting",
            Self::Started => "started",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Archiving => "archiving",
            Self::Archived => "archived",
            Self::Destroying => "destroying",
            Self::Destroyed => "destroyed",
            Self::PendingBuild => "pending_build",
            Self::BuildFailed => "build_failed",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the sandbox accepts toolbox calls in this state.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Started)
    }

    /// Whether the sandbox must be started before it can run commands again.
    pub fn needs_start(&self) -> bool {
        matches!(self, Self::Stopped | Self::Archived)
    }

    /// Whether the sandbox can never reach `started` from this state.
    pub fn is_failed(&self) -> bool {
        matches!(
            self,
            Self::Error | Self::BuildFailed | Self::Destroying | Self::Destroyed
        )
    }
}

impl From<String> for SandboxState {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "creating" => Self::Creating,
            "restoring" => Self::Restoring,
            "starting" => Self::Starting,
            "started" => Self::Started,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            "archiving" => Self::Archiving,
            "archived" => Self::Archived,
            "destroying" => Self::Destroying,
            "destroyed" => Self::Destroyed,
            "pending_build" => Self::PendingBuild,
            "build_failed" => Self::BuildFailed,
            "error" => Self::Error,
            _ => Self::Unknown,
        }
    }
}

impl From<SandboxState> for String {
    fn from(state: SandboxState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for SandboxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sandbox as described by the control plane (subset of fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sandbox {
    pub id: String,
    #[serde(default)]
    pub state: SandboxState,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
}

/// Reply to a session command submission.
///
/// Synchronous commands carry output and exit code; asynchronous ones
/// usually only carry the command id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExecResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd_id: Option<String>,
    /// Combined output (older toolbox builds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}
