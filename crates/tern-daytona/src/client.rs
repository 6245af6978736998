//! HTTP client for the Daytona control plane and toolbox API.
//!
//! The control plane manages sandbox lifecycle (`/sandbox/...`); the
//! toolbox proxies process and session calls into a running sandbox
//! (`/toolbox/{id}/toolbox/...`). Both share one base URL and bearer token.

use crate::config::DaytonaConfig;
use crate::error::{DaytonaError, Result};
use crate::models::{Sandbox, SessionExecResponse};
use crate::request::{CreateSandboxRequest, CreateSessionRequest, SessionExecRequest};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// Value sent in the `X-Daytona-Source` header.
const SOURCE_HEADER: &str = "tern";

/// Backend primitives a sandbox provider needs.
///
/// [`DaytonaClient`] is the production implementation; the trait exists so
/// higher layers can run against an in-memory backend.
#[async_trait]
pub trait SandboxApi: Send + Sync {
    /// Create a sandbox. The reply reflects its state at submission time.
    async fn create_sandbox(&self, request: &CreateSandboxRequest) -> Result<Sandbox>;

    /// Fetch a sandbox by id. Unknown ids yield [`DaytonaError::NotFound`].
    async fn get_sandbox(&self, id: &str) -> Result<Sandbox>;

    /// List sandboxes carrying all of the given labels.
    async fn list_sandboxes(&self, labels: &HashMap<String, String>) -> Result<Vec<Sandbox>>;

    /// Start a stopped or archived sandbox.
    async fn start_sandbox(&self, id: &str) -> Result<Sandbox>;

    /// Delete a sandbox.
    async fn delete_sandbox(&self, id: &str) -> Result<()>;

    /// Create a named session. Must succeed if the session already exists.
    async fn create_session(&self, sandbox_id: &str, session_id: &str) -> Result<()>;

    /// Run a command inside a session.
    async fn execute_session_command(
        &self,
        sandbox_id: &str,
        session_id: &str,
        request: &SessionExecRequest,
    ) -> Result<SessionExecResponse>;
}

/// Client for the Daytona REST API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct DaytonaClient {
    http: Client,
    config: DaytonaConfig,
}

impl DaytonaClient {
    /// Build a client from validated configuration.
    ///
    /// No request is made here, but every configuration problem (missing key,
    /// bad URL, unusable header value) is reported immediately.
    pub fn new(config: DaytonaConfig) -> Result<Self> {
        config.validate()?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| DaytonaError::Config(format!("api_key is not a valid header: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert("X-Daytona-Source", HeaderValue::from_static(SOURCE_HEADER));

        let http = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()?;

        tracing::debug!(
            server_url = %config.server_url,
            target = %config.target,
            "Daytona client created"
        );
        Ok(Self { http, config })
    }

    /// Get the configuration this client was built with.
    pub fn config(&self) -> &DaytonaConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    fn session_url(&self, sandbox_id: &str, suffix: &str) -> String {
        self.url(&format!(
            "/toolbox/{sandbox_id}/toolbox/process/session{suffix}"
        ))
    }
}

#[async_trait]
impl SandboxApi for DaytonaClient {
    async fn create_sandbox(&self, request: &CreateSandboxRequest) -> Result<Sandbox> {
        tracing::debug!(image = %request.image, target = ?request.target, "POST /sandbox");
        let resp = self
            .http
            .post(self.url("/sandbox"))
            .json(request)
            .send()
            .await?;
        let sandbox: Sandbox = read_json(resp, "new sandbox").await?;
        tracing::info!(sandbox_id = %sandbox.id, state = %sandbox.state, "Daytona sandbox created");
        Ok(sandbox)
    }

    async fn get_sandbox(&self, id: &str) -> Result<Sandbox> {
        tracing::debug!(sandbox_id = %id, "GET /sandbox/{{id}}");
        let resp = self
            .http
            .get(self.url(&format!("/sandbox/{id}")))
            .send()
            .await?;
        read_json(resp, id).await
    }

    async fn list_sandboxes(&self, labels: &HashMap<String, String>) -> Result<Vec<Sandbox>> {
        let labels = serde_json::to_string(labels)?;
        tracing::debug!(labels = %labels, "GET /sandbox");
        let resp = self
            .http
            .get(self.url("/sandbox"))
            .query(&[("labels", labels.as_str())])
            .send()
            .await?;
        read_json(resp, "sandbox list").await
    }

    async fn start_sandbox(&self, id: &str) -> Result<Sandbox> {
        tracing::debug!(sandbox_id = %id, "POST /sandbox/{{id}}/start");
        let resp = self
            .http
            .post(self.url(&format!("/sandbox/{id}/start")))
            .send()
            .await?;
        let resp = check_status(resp, id).await?;
        let body = resp.text().await?;

        // Older control planes reply 200 with an empty body
        if body.trim().is_empty() {
            return self.get_sandbox(id).await;
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn delete_sandbox(&self, id: &str) -> Result<()> {
        tracing::debug!(sandbox_id = %id, "DELETE /sandbox/{{id}}");
        let resp = self
            .http
            .delete(self.url(&format!("/sandbox/{id}")))
            .send()
            .await?;
        check_status(resp, id).await?;
        tracing::debug!(sandbox_id = %id, "Daytona sandbox deleted");
        Ok(())
    }

    async fn create_session(&self, sandbox_id: &str, session_id: &str) -> Result<()> {
        tracing::debug!(sandbox_id = %sandbox_id, session_id = %session_id, "Creating session");
        let resp = self
            .http
            .post(self.session_url(sandbox_id, ""))
            .json(&CreateSessionRequest { session_id })
            .send()
            .await?;

        match check_status(resp, sandbox_id).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_conflict() => {
                tracing::trace!(sandbox_id = %sandbox_id, session_id = %session_id, "Session already exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn execute_session_command(
        &self,
        sandbox_id: &str,
        session_id: &str,
        request: &SessionExecRequest,
    ) -> Result<SessionExecResponse> {
        tracing::debug!(
            sandbox_id = %sandbox_id,
            session_id = %session_id,
            run_async = request.run_async,
            "Executing session command"
        );
        let resp = self
            .http
            .post(self.session_url(sandbox_id, &format!("/{session_id}/exec")))
            .json(request)
            .send()
            .await?;
        read_json(resp, sandbox_id).await
    }
}

/// Map non-success responses to errors, keeping the API's message.
async fn check_status(resp: Response, resource: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(DaytonaError::NotFound(resource.to_string()));
    }

    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body);
    tracing::debug!(status = status.as_u16(), message = %message, "Daytona API error");
    Err(DaytonaError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(resp: Response, resource: &str) -> Result<T> {
    let resp = check_status(resp, resource).await?;
    let body = resp.text().await?;
    tracing::trace!(body = %body, "Daytona response body");
    Ok(serde_json::from_str(&body)?)
}

/// Pull `message` out of a JSON error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    match parsed.as_ref().and_then(|v| v.get("message")) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join("; "),
        _ if body.trim().is_empty() => "empty response body".to_string(),
        _ => body.trim().to_string(),
    }
}
