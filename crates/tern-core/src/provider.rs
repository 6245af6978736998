//! The sandbox provider contract.

use crate::error::Result;
use crate::runtime::RuntimeKind;
use crate::sandbox::{ExecRequest, ExecResult, SandboxHandle};
use async_trait::async_trait;

/// Provisions sandboxes and runs commands inside them.
///
/// Implementations are shared across tasks behind an `Arc` and must be safe
/// to call concurrently for different sandboxes. Commands sent to the same
/// session are not serialised here.
#[async_trait]
pub trait SandboxProvider: Send + Sync {
    /// Runtime this provider implements.
    fn runtime(&self) -> RuntimeKind;

    /// Provision a new sandbox and start its bootstrap process.
    ///
    /// `password` protects the sandbox's remote desktop. `project_id`, when
    /// given, is attached as a label and never changed afterwards.
    async fn create(&self, password: &str, project_id: Option<&str>) -> Result<SandboxHandle>;

    /// Bring a stopped or archived sandbox back. No-op when already running.
    async fn start(&self, handle: &SandboxHandle) -> Result<SandboxHandle>;

    /// Look up a sandbox by id without changing it.
    async fn get_current_sandbox(&self, sandbox_id: &str) -> Result<SandboxHandle>;

    /// Run a command in the request's session, creating the session first
    /// if needed.
    async fn exec(&self, handle: &SandboxHandle, request: &ExecRequest) -> Result<ExecResult>;

    /// Fetch a sandbox and restart it once if it has gone to sleep.
    ///
    /// Backends whose sandboxes never stop can keep the default, which is a
    /// plain lookup.
    async fn ensure_running(&self, sandbox_id: &str) -> Result<SandboxHandle> {
        self.get_current_sandbox(sandbox_id).await
    }

    /// Find the sandbox labelled with `project_id`, if any.
    ///
    /// Backends that keep no project labels answer `None`.
    async fn find_by_project(&self, _project_id: &str) -> Result<Option<SandboxHandle>> {
        Ok(None)
    }

    /// Tear the sandbox down.
    async fn delete(&self, handle: &SandboxHandle) -> Result<()>;
}
