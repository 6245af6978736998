//! TernServer - runtime administration operations.
//!
//! Each operation here backs one HTTP endpoint. The server talks to the
//! runtime registry through [`RuntimeAdmin`] so the endpoints can be
//! exercised against registries that fail.

use crate::error::ApiError;
use crate::types::{HealthResponse, HealthStatus, StatusResponse, SwitchResponse};
use async_trait::async_trait;
use std::sync::Arc;
use tern_core::{CoreError, RuntimeInfo, RuntimeManager, RuntimeProbe, SwitchOutcome};

/// Runtime registry operations the administration API needs.
#[async_trait]
pub trait RuntimeAdmin: Send + Sync {
    /// Current selection and the registered runtimes.
    fn runtime_info(&self) -> Result<RuntimeInfo, CoreError>;

    /// Whether the current runtime is configured.
    fn runtime_configured(&self) -> Result<bool, CoreError>;

    /// Select a runtime by name.
    async fn switch_runtime(&self, name: &str) -> Result<SwitchOutcome, CoreError>;

    /// Check a runtime by name without selecting it.
    fn probe_runtime(&self, name: &str) -> Result<RuntimeProbe, CoreError>;
}

#[async_trait]
impl RuntimeAdmin for RuntimeManager {
    fn runtime_info(&self) -> Result<RuntimeInfo, CoreError> {
        Ok(self.get_runtime_info())
    }

    fn runtime_configured(&self) -> Result<bool, CoreError> {
        Ok(self.validate_runtime_config())
    }

    async fn switch_runtime(&self, name: &str) -> Result<SwitchOutcome, CoreError> {
        RuntimeManager::switch_runtime(self, name).await
    }

    fn probe_runtime(&self, name: &str) -> Result<RuntimeProbe, CoreError> {
        RuntimeManager::probe_runtime(self, name)
    }
}

/// Administration server shared by all request handlers.
#[derive(Clone)]
pub struct TernServer {
    admin: Arc<dyn RuntimeAdmin>,
}

impl TernServer {
    /// Create a server over the process-wide runtime manager.
    pub fn new(manager: Arc<RuntimeManager>) -> Self {
        Self { admin: manager }
    }

    /// Create a server over any runtime registry.
    pub fn with_admin(admin: Arc<dyn RuntimeAdmin>) -> Self {
        Self { admin }
    }

    pub fn status(&self) -> Result<StatusResponse, ApiError> {
        let info = self.admin.runtime_info()?;
        let runtime_configured = self.admin.runtime_configured()?;
        Ok(StatusResponse {
            current_runtime: info.runtime,
            available_runtimes: info.available_runtimes.clone(),
            runtime_configured,
            runtime_info: info,
        })
    }

    pub async fn switch(&self, name: &str) -> Result<SwitchResponse, ApiError> {
        tracing::info!(requested = %name, "Runtime switch requested");
        let outcome = self.admin.switch_runtime(name).await?;
        Ok(SwitchResponse {
            status: "success",
            message: format!(
                "Switched runtime from {} to {}",
                outcome.previous, outcome.current
            ),
            previous_runtime: outcome.previous,
            current_runtime: outcome.current,
        })
    }

    pub fn validate(&self, name: &str) -> Result<RuntimeProbe, ApiError> {
        Ok(self.admin.probe_runtime(name)?)
    }

    /// Report health. Never fails; registry errors become an error report.
    pub fn health(&self) -> HealthResponse {
        let timestamp = chrono::Utc::now().to_rfc3339();
        let report = self.admin.runtime_info().and_then(|info| {
            let configured = self.admin.runtime_configured()?;
            Ok((info.runtime, configured))
        });

        match report {
            Ok((runtime, configured)) => HealthResponse::Report {
                status: if configured {
                    HealthStatus::Healthy
                } else {
                    HealthStatus::Unhealthy
                },
                runtime,
                configured,
                timestamp,
            },
            Err(e) => {
                tracing::error!(error = %e, "Runtime health check failed");
                HealthResponse::Error {
                    status: "error",
                    error: e.to_string(),
                    timestamp,
                }
            }
        }
    }
}
