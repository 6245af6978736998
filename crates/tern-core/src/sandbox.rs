//! Sandbox handles and command execution types.

use crate::runtime::RuntimeKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tern_daytona::SandboxState;
use uuid::Uuid;

/// Session used when a request does not name one.
pub const DEFAULT_SESSION: &str = "default";

/// Last observed lifecycle state of a sandbox, independent of backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SandboxStatus {
    /// Ready for commands.
    Running,
    /// Stopped; needs a start before it can run commands.
    Stopped,
    /// Archived; needs a start (and restore) before it can run commands.
    Archived,
    /// In transition (creating, starting, stopping, ...).
    Pending,
    /// Backend reported a failure.
    Failed,
    /// Backend reported something we do not recognise.
    Unknown,
}

impl SandboxStatus {
    /// Whether the sandbox accepts commands in this state.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl From<&SandboxState> for SandboxStatus {
    fn from(state: &SandboxState) -> Self {
        match state {
            SandboxState::Started => Self::Running,
            SandboxState::Stopped => Self::Stopped,
            SandboxState::Archived => Self::Archived,
            SandboxState::Creating
            | SandboxState::Restoring
            | SandboxState::Starting
            | SandboxState::Stopping
            | SandboxState::Archiving
            | SandboxState::Destroying
            | SandboxState::PendingBuild => Self::Pending,
            SandboxState::Destroyed | SandboxState::BuildFailed | SandboxState::Error => {
                Self::Failed
            }
            SandboxState::Unknown => Self::Unknown,
        }
    }
}

impl fmt::Display for SandboxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Archived => "archived",
            Self::Pending => "pending",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Opaque reference to a provisioned sandbox.
///
/// Issued by a provider and only meaningful to the provider that issued it.
/// The payload carries whatever the backend returned; callers should not
/// depend on its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxHandle {
    id: String,
    runtime: RuntimeKind,
    status: SandboxStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    project_id: Option<String>,
    #[serde(default)]
    payload: serde_json::Value,
    observed_at: DateTime<Utc>,
}

impl SandboxHandle {
    /// Create a handle observed now.
    pub fn new(id: impl Into<String>, runtime: RuntimeKind, status: SandboxStatus) -> Self {
        Self {
            id: id.into(),
            runtime,
            status,
            project_id: None,
            payload: serde_json::Value::Null,
            observed_at: Utc::now(),
        }
    }

    /// Attach the project label.
    pub fn with_project_id(mut self, project_id: Option<String>) -> Self {
        self.project_id = project_id;
        self
    }

    /// Attach the backend's raw description.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn runtime(&self) -> RuntimeKind {
        self.runtime
    }

    pub fn status(&self) -> SandboxStatus {
        self.status
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// When the status was last observed.
    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Whether the sandbox was running when last observed.
    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }
}

/// A command to run inside a sandbox session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    /// Shell command line.
    pub command: String,
    /// Target session; `None` means [`DEFAULT_SESSION`].
    pub session: Option<String>,
    /// Return as soon as the backend accepts the command.
    pub run_async: bool,
}

impl ExecRequest {
    /// Synchronous request in the default session.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            session: None,
            run_async: false,
        }
    }

    /// Run in the named session.
    pub fn in_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Submit without waiting for completion.
    pub fn detached(mut self) -> Self {
        self.run_async = true;
        self
    }

    /// Session the command will run in.
    pub fn session_id(&self) -> &str {
        self.session.as_deref().unwrap_or(DEFAULT_SESSION)
    }
}

/// Whether a command finished or was only accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecStatus {
    Completed,
    Submitted,
}

/// Outcome of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecResult {
    pub status: ExecStatus,
    pub stdout: String,
    pub stderr: String,
    /// Exit code, absent for submitted commands or when the backend omits it.
    pub exit_code: Option<i32>,
    /// Backend command id, when the backend assigns one.
    pub command_id: Option<String>,
}

impl ExecResult {
    /// A finished command.
    pub fn completed(stdout: String, stderr: String, exit_code: Option<i32>) -> Self {
        Self {
            status: ExecStatus::Completed,
            stdout,
            stderr,
            exit_code,
            command_id: None,
        }
    }

    /// A command accepted for background execution.
    pub fn submitted(command_id: Option<String>) -> Self {
        Self {
            status: ExecStatus::Submitted,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            command_id,
        }
    }

    /// Whether the command completed with exit code 0.
    pub fn success(&self) -> bool {
        self.status == ExecStatus::Completed && self.exit_code == Some(0)
    }
}

/// Generate a fresh access password for a sandbox's remote desktop.
pub fn generate_password() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_backend_state() {
        assert_eq!(SandboxStatus::from(&SandboxState::Started), SandboxStatus::Running);
        assert_eq!(SandboxStatus::from(&SandboxState::Archived), SandboxStatus::Archived);
        assert_eq!(SandboxStatus::from(&SandboxState::Starting), SandboxStatus::Pending);
        assert_eq!(SandboxStatus::from(&SandboxState::BuildFailed), SandboxStatus::Failed);
        assert_eq!(SandboxStatus::from(&SandboxState::Unknown), SandboxStatus::Unknown);
    }

    #[test]
    fn test_exec_request_defaults() {
        let req = ExecRequest::new("ls");
        assert_eq!(req.session_id(), DEFAULT_SESSION);
        assert!(!req.run_async);

        let req = ExecRequest::new("ls").in_session("build").detached();
        assert_eq!(req.session_id(), "build");
        assert!(req.run_async);
    }

    #[test]
    fn test_exec_result_success() {
        assert!(ExecResult::completed("ok".into(), String::new(), Some(0)).success());
        assert!(!ExecResult::completed(String::new(), "boom".into(), Some(1)).success());
        assert!(!ExecResult::submitted(Some("cmd-1".into())).success());
    }

    #[test]
    fn test_handle_serializes_without_empty_project() {
        let handle = SandboxHandle::new("sb-1", RuntimeKind::Daytona, SandboxStatus::Running);
        let json = serde_json::to_value(&handle).unwrap();
        assert_eq!(json["runtime"], "daytona");
        assert_eq!(json["status"], "running");
        assert!(json.get("project_id").is_none());
    }

    #[test]
    fn test_passwords_are_unique() {
        let a = generate_password();
        let b = generate_password();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
