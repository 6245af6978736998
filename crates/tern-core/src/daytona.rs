//! Remote sandboxes on Daytona.

use crate::config::ProviderConfig;
use crate::error::{CoreError, Result};
use crate::provider::SandboxProvider;
use crate::runtime::RuntimeKind;
use crate::sandbox::{ExecRequest, ExecResult, SandboxHandle, SandboxStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tern_daytona::{
    CreateSandboxRequest, DaytonaClient, Sandbox, SandboxApi, SessionExecRequest,
};

/// Session the supervisor process runs in.
pub const BOOTSTRAP_SESSION: &str = "supervisord-session";

/// Label key carrying the project id.
pub const PROJECT_LABEL: &str = "id";

/// Pause between state checks while a new sandbox comes up.
const READY_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Environment handed to every new sandbox.
fn sandbox_env(password: &str) -> Vec<(&'static str, String)> {
    vec![
        ("CHROME_PERSISTENT_SESSION", "true".into()),
        ("RESOLUTION", "1024x768x24".into()),
        ("RESOLUTION_WIDTH", "1024".into()),
        ("RESOLUTION_HEIGHT", "768".into()),
        ("VNC_PASSWORD", password.into()),
        ("ANONYMIZED_TELEMETRY", "false".into()),
        ("CHROME_PATH", String::new()),
        ("CHROME_USER_DATA", String::new()),
        ("CHROME_DEBUGGING_PORT", "9222".into()),
        ("CHROME_DEBUGGING_HOST", "localhost".into()),
        ("CHROME_CDP", String::new()),
    ]
}

/// Provider backed by the Daytona REST API.
///
/// Generic over the API so the lifecycle logic can run against an
/// in-memory backend.
pub struct DaytonaProvider<A: SandboxApi = DaytonaClient> {
    api: A,
    image: String,
    entrypoint: String,
    target: String,
    cpu: u32,
    memory_gib: u32,
    disk_gib: u32,
    auto_stop_minutes: u32,
    auto_archive_minutes: u32,
    restart_settle: Duration,
    ready_timeout: Duration,
}

impl DaytonaProvider<DaytonaClient> {
    /// Build a provider talking to the configured Daytona server.
    ///
    /// Fails with [`CoreError::Config`] when the key, URL, or target is
    /// missing or malformed. No request is made.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = DaytonaClient::new(config.daytona_config())?;
        Ok(Self::with_api(client, config))
    }
}

impl<A: SandboxApi> DaytonaProvider<A> {
    /// Build a provider over an arbitrary API implementation.
    pub fn with_api(api: A, config: &ProviderConfig) -> Self {
        Self {
            api,
            image: config.image.clone(),
            entrypoint: config.entrypoint.clone(),
            target: config.daytona_target.clone(),
            cpu: config.resources.cpu,
            memory_gib: config.resources.memory_gib,
            disk_gib: config.resources.disk_gib,
            auto_stop_minutes: config.auto_stop_minutes,
            auto_archive_minutes: config.auto_archive_minutes,
            restart_settle: config.restart_settle,
            ready_timeout: config.ready_timeout,
        }
    }

    fn create_request(&self, password: &str, project_id: Option<&str>) -> Result<CreateSandboxRequest> {
        let mut builder = CreateSandboxRequest::builder(&self.image)
            .public(true)
            .cpu(self.cpu)
            .memory_gib(self.memory_gib)
            .disk_gib(self.disk_gib)
            .target(&self.target)
            .auto_stop_minutes(self.auto_stop_minutes)
            .auto_archive_minutes(self.auto_archive_minutes)
            .envs(sandbox_env(password));
        if let Some(project_id) = project_id {
            builder = builder.label(PROJECT_LABEL, project_id);
        }
        Ok(builder.build()?)
    }

    /// Poll a new sandbox until the control plane reports it `started`.
    ///
    /// Gives up at the first terminal state or once `ready_timeout` has
    /// passed.
    async fn wait_until_started(&self, mut sandbox: Sandbox) -> Result<Sandbox> {
        let deadline = tokio::time::Instant::now() + self.ready_timeout;
        loop {
            if sandbox.state.is_running() {
                return Ok(sandbox);
            }
            if sandbox.state.is_failed() || tokio::time::Instant::now() >= deadline {
                tracing::error!(
                    sandbox_id = %sandbox.id,
                    state = %sandbox.state,
                    reason = ?sandbox.error_reason,
                    "Sandbox never became ready"
                );
                return Err(CoreError::NotReady {
                    sandbox_id: sandbox.id,
                    state: sandbox.state.to_string(),
                });
            }
            tracing::trace!(sandbox_id = %sandbox.id, state = %sandbox.state, "Waiting for sandbox");
            tokio::time::sleep(READY_POLL_INTERVAL).await;
            sandbox = self.api.get_sandbox(&sandbox.id).await?;
        }
    }

    /// Delete a sandbox `create` could not finish. Best effort.
    async fn discard(&self, sandbox_id: &str) {
        if let Err(e) = self.api.delete_sandbox(sandbox_id).await {
            tracing::warn!(sandbox_id, error = %e, "Cleanup of unfinished sandbox failed");
        }
    }

    /// Start the supervisor in its own session without waiting for it.
    async fn bootstrap(&self, sandbox_id: &str) -> Result<()> {
        let command = format!("exec {}", self.entrypoint);
        match self.submit_supervisor(sandbox_id, &command).await {
            Ok(()) => {
                tracing::debug!(sandbox_id, command = %command, "Supervisor started");
                Ok(())
            }
            Err(e) => {
                tracing::error!(sandbox_id, error = %e, "Supervisor bootstrap failed");
                Err(CoreError::Bootstrap {
                    sandbox_id: sandbox_id.to_string(),
                    source: e,
                })
            }
        }
    }

    async fn submit_supervisor(&self, sandbox_id: &str, command: &str) -> tern_daytona::Result<()> {
        self.api.create_session(sandbox_id, BOOTSTRAP_SESSION).await?;
        self.api
            .execute_session_command(
                sandbox_id,
                BOOTSTRAP_SESSION,
                &SessionExecRequest::new(command).run_async(true),
            )
            .await?;
        Ok(())
    }

    fn check_handle(&self, handle: &SandboxHandle) -> Result<()> {
        if handle.runtime() != RuntimeKind::Daytona {
            return Err(CoreError::ForeignHandle {
                expected: RuntimeKind::Daytona,
                actual: handle.runtime(),
            });
        }
        Ok(())
    }
}

fn to_handle(sandbox: Sandbox) -> SandboxHandle {
    let status = SandboxStatus::from(&sandbox.state);
    let project_id = sandbox.labels.get(PROJECT_LABEL).cloned();
    let payload = serde_json::to_value(&sandbox).unwrap_or_default();
    SandboxHandle::new(sandbox.id, RuntimeKind::Daytona, status)
        .with_project_id(project_id)
        .with_payload(payload)
}

#[async_trait]
impl<A: SandboxApi> SandboxProvider for DaytonaProvider<A> {
    fn runtime(&self) -> RuntimeKind {
        RuntimeKind::Daytona
    }

    async fn create(&self, password: &str, project_id: Option<&str>) -> Result<SandboxHandle> {
        let start = Instant::now();
        let request = self.create_request(password, project_id)?;
        tracing::info!(
            image = %request.image,
            project_id = ?project_id,
            cpu = request.cpu,
            memory_gib = request.memory,
            disk_gib = request.disk,
            "Creating sandbox"
        );

        let created = self.api.create_sandbox(&request).await.map_err(|e| {
            tracing::error!(error = %e, "Sandbox creation failed");
            CoreError::from(e)
        })?;
        let sandbox_id = created.id.clone();

        let sandbox = match self.wait_until_started(created).await {
            Ok(sandbox) => sandbox,
            Err(e) => {
                self.discard(&sandbox_id).await;
                return Err(e);
            }
        };
        if let Err(e) = self.bootstrap(&sandbox_id).await {
            self.discard(&sandbox_id).await;
            return Err(e);
        }

        tracing::info!(
            sandbox_id = %sandbox_id,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Sandbox ready"
        );
        Ok(to_handle(sandbox))
    }

    async fn start(&self, handle: &SandboxHandle) -> Result<SandboxHandle> {
        self.check_handle(handle)?;
        let current = self.api.get_sandbox(handle.id()).await?;
        if current.state.is_running() {
            tracing::debug!(sandbox_id = %handle.id(), "Sandbox already running");
            return Ok(to_handle(current));
        }

        tracing::info!(sandbox_id = %handle.id(), state = %current.state, "Starting sandbox");
        let started = self.api.start_sandbox(handle.id()).await.map_err(|e| {
            tracing::error!(sandbox_id = %handle.id(), error = %e, "Sandbox start failed");
            CoreError::from(e)
        })?;
        Ok(to_handle(started))
    }

    async fn get_current_sandbox(&self, sandbox_id: &str) -> Result<SandboxHandle> {
        let sandbox = self.api.get_sandbox(sandbox_id).await?;
        Ok(to_handle(sandbox))
    }

    async fn exec(&self, handle: &SandboxHandle, request: &ExecRequest) -> Result<ExecResult> {
        self.check_handle(handle)?;
        let session = request.session_id();
        tracing::debug!(
            sandbox_id = %handle.id(),
            session,
            run_async = request.run_async,
            "Executing command"
        );
        tracing::trace!(command = %request.command, "Command body");

        self.api.create_session(handle.id(), session).await?;
        let reply = self
            .api
            .execute_session_command(
                handle.id(),
                session,
                &SessionExecRequest::new(&request.command).run_async(request.run_async),
            )
            .await
            .map_err(|e| {
                tracing::error!(sandbox_id = %handle.id(), session, error = %e, "Command failed");
                CoreError::from(e)
            })?;

        if request.run_async {
            return Ok(ExecResult::submitted(reply.cmd_id));
        }
        let mut result = ExecResult::completed(
            reply.stdout.or(reply.output).unwrap_or_default(),
            reply.stderr.unwrap_or_default(),
            reply.exit_code,
        );
        result.command_id = reply.cmd_id;
        Ok(result)
    }

    async fn ensure_running(&self, sandbox_id: &str) -> Result<SandboxHandle> {
        let sandbox = self.api.get_sandbox(sandbox_id).await?;
        if !sandbox.state.needs_start() {
            return Ok(to_handle(sandbox));
        }

        tracing::info!(sandbox_id, state = %sandbox.state, "Sandbox asleep, restarting");
        self.api.start_sandbox(sandbox_id).await.map_err(|e| {
            tracing::error!(sandbox_id, error = %e, "Sandbox restart failed");
            CoreError::from(e)
        })?;
        tokio::time::sleep(self.restart_settle).await;

        let refreshed = self.api.get_sandbox(sandbox_id).await?;
        self.bootstrap(sandbox_id).await?;
        tracing::info!(sandbox_id, state = %refreshed.state, "Sandbox restarted");
        Ok(to_handle(refreshed))
    }

    async fn find_by_project(&self, project_id: &str) -> Result<Option<SandboxHandle>> {
        let labels = HashMap::from([(PROJECT_LABEL.to_string(), project_id.to_string())]);
        let found = self.api.list_sandboxes(&labels).await?;
        tracing::debug!(project_id, matches = found.len(), "Looked up sandbox by project");
        Ok(found.into_iter().next().map(to_handle))
    }

    async fn delete(&self, handle: &SandboxHandle) -> Result<()> {
        self.check_handle(handle)?;
        self.api.delete_sandbox(handle.id()).await?;
        tracing::info!(sandbox_id = %handle.id(), "Sandbox deleted");
        Ok(())
    }
}
