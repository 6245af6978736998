//! Local stub provider.
//!
//! Runs commands on the host in a fixed directory. There is no provisioning,
//! no isolation and no session continuity; it exists so the rest of the
//! system can run without a remote backend.

use crate::config::ProviderConfig;
use crate::error::{CoreError, Result};
use crate::provider::SandboxProvider;
use crate::runtime::RuntimeKind;
use crate::sandbox::{ExecRequest, ExecResult, SandboxHandle, SandboxStatus};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Maximum bytes kept from each output stream (1 MiB).
const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// Truncate to `max_bytes`, backing off to a UTF-8 boundary.
fn truncate_output(s: String, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut truncated = s[..end].to_string();
    truncated.push_str("\n... [output truncated]");
    truncated
}

/// Provider that executes on the local host.
#[derive(Debug, Clone)]
pub struct E2BProvider {
    base_path: PathBuf,
}

impl E2BProvider {
    /// Build a provider rooted at the configured base path.
    pub fn new(config: &ProviderConfig) -> Self {
        Self::with_base_path(&config.local_base_path)
    }

    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Directory commands run in.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn handle(&self, id: &str) -> SandboxHandle {
        SandboxHandle::new(id, RuntimeKind::E2b, SandboxStatus::Running).with_payload(
            serde_json::json!({ "base_path": self.base_path.display().to_string() }),
        )
    }
}

#[async_trait]
impl SandboxProvider for E2BProvider {
    fn runtime(&self) -> RuntimeKind {
        RuntimeKind::E2b
    }

    async fn create(&self, _password: &str, project_id: Option<&str>) -> Result<SandboxHandle> {
        tokio::fs::create_dir_all(&self.base_path).await?;
        let id = self.base_path.display().to_string();
        tracing::info!(sandbox_id = %id, project_id = ?project_id, "Local sandbox ready");
        Ok(self
            .handle(&id)
            .with_project_id(project_id.map(str::to_string)))
    }

    async fn start(&self, handle: &SandboxHandle) -> Result<SandboxHandle> {
        Ok(self.handle(handle.id()).with_project_id(handle.project_id().map(str::to_string)))
    }

    async fn get_current_sandbox(&self, sandbox_id: &str) -> Result<SandboxHandle> {
        Ok(self.handle(sandbox_id))
    }

    async fn exec(&self, handle: &SandboxHandle, request: &ExecRequest) -> Result<ExecResult> {
        if handle.runtime() != RuntimeKind::E2b {
            return Err(CoreError::ForeignHandle {
                expected: RuntimeKind::E2b,
                actual: handle.runtime(),
            });
        }
        tracing::debug!(cwd = %self.base_path.display(), "Executing local command");
        tracing::trace!(command = %request.command, "Command body");

        let output = Command::new("sh")
            .arg("-c")
            .arg(&request.command)
            .current_dir(&self.base_path)
            .output()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, cwd = %self.base_path.display(), "Failed to spawn shell");
                CoreError::Io(e)
            })?;

        let stdout = truncate_output(
            String::from_utf8_lossy(&output.stdout).into_owned(),
            MAX_OUTPUT_SIZE,
        );
        let stderr = truncate_output(
            String::from_utf8_lossy(&output.stderr).into_owned(),
            MAX_OUTPUT_SIZE,
        );
        let exit_code = output.status.code();
        tracing::debug!(
            exit_code = ?exit_code,
            stdout_len = stdout.len(),
            stderr_len = stderr.len(),
            "Local command completed"
        );
        Ok(ExecResult::completed(stdout, stderr, exit_code))
    }

    async fn find_by_project(&self, project_id: &str) -> Result<Option<SandboxHandle>> {
        let id = self.base_path.display().to_string();
        Ok(Some(
            self.handle(&id)
                .with_project_id(Some(project_id.to_string())),
        ))
    }

    async fn delete(&self, handle: &SandboxHandle) -> Result<()> {
        tracing::debug!(sandbox_id = %handle.id(), "Local sandbox delete is a no-op");
        Ok(())
    }
}
