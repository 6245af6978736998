//! Request and response bodies for the administration API.

use serde::{Deserialize, Serialize};
use tern_core::{RuntimeInfo, RuntimeKind};

/// Body of `GET /api/runtime/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub current_runtime: RuntimeKind,
    pub available_runtimes: Vec<RuntimeKind>,
    /// Whether the current runtime is configured.
    pub runtime_configured: bool,
    pub runtime_info: RuntimeInfo,
}

/// Body of `POST /api/runtime/switch`.
#[derive(Debug, Deserialize)]
pub struct SwitchRequest {
    /// Name of the runtime to select.
    pub runtime: String,
}

/// Reply to a successful switch.
#[derive(Debug, Serialize)]
pub struct SwitchResponse {
    /// Always `"success"`.
    pub status: &'static str,
    pub message: String,
    pub previous_runtime: RuntimeKind,
    pub current_runtime: RuntimeKind,
}

/// Health of the selected runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Body of `GET /api/runtime/health`.
///
/// The endpoint always answers 200; failures are reported in the body.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HealthResponse {
    Report {
        status: HealthStatus,
        runtime: RuntimeKind,
        configured: bool,
        timestamp: String,
    },
    Error {
        /// Always `"error"`.
        status: &'static str,
        error: String,
        timestamp: String,
    },
}
