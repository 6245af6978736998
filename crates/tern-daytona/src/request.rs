//! Request bodies, with a builder for sandbox creation.

use crate::error::{DaytonaError, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Body of `POST /sandbox`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSandboxRequest {
    pub image: String,
    pub public: bool,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub cpu: u32,
    /// Memory in GiB.
    pub memory: u32,
    /// Disk in GiB.
    pub disk: u32,
    /// Minutes of inactivity before the sandbox is stopped (0 disables).
    pub auto_stop_interval: u32,
    /// Minutes a stopped sandbox waits before being archived.
    pub auto_archive_interval: u32,
}

impl CreateSandboxRequest {
    /// Start building a request for the given image.
    pub fn builder(image: impl Into<String>) -> CreateSandboxBuilder {
        CreateSandboxBuilder::new(image)
    }
}

/// Fluent builder for [`CreateSandboxRequest`].
///
/// # Example
///
/// ```
/// use tern_daytona::CreateSandboxRequest;
///
/// let request = CreateSandboxRequest::builder("kortix/suna:0.1.3")
///     .cpu(2)
///     .memory_gib(4)
///     .disk_gib(5)
///     .public(true)
///     .label("id", "project-1")
///     .env("VNC_PASSWORD", "secret")
///     .build()
///     .unwrap();
/// assert_eq!(request.labels["id"], "project-1");
/// ```
#[derive(Debug, Clone)]
pub struct CreateSandboxBuilder {
    request: CreateSandboxRequest,
}

impl CreateSandboxBuilder {
    /// Create a builder with the default resource profile (2 vCPU, 4 GiB, 5 GiB).
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            request: CreateSandboxRequest {
                image: image.into(),
                public: false,
                labels: HashMap::new(),
                env: HashMap::new(),
                target: None,
                cpu: 2,
                memory: 4,
                disk: 5,
                auto_stop_interval: 15,
                auto_archive_interval: 24 * 60,
            },
        }
    }

    /// Set the vCPU count.
    pub fn cpu(mut self, count: u32) -> Self {
        self.request.cpu = count;
        self
    }

    /// Set memory in GiB.
    pub fn memory_gib(mut self, gib: u32) -> Self {
        self.request.memory = gib;
        self
    }

    /// Set disk in GiB.
    pub fn disk_gib(mut self, gib: u32) -> Self {
        self.request.disk = gib;
        self
    }

    /// Make the sandbox's preview URLs publicly reachable.
    pub fn public(mut self, public: bool) -> Self {
        self.request.public = public;
        self
    }

    /// Attach a lookup label.
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.labels.insert(key.into(), value.into());
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.env.insert(key.into(), value.into());
        self
    }

    /// Add several environment variables.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.request
            .env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set the target region.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.request.target = Some(target.into());
        self
    }

    /// Set the auto-stop interval in minutes.
    pub fn auto_stop_minutes(mut self, minutes: u32) -> Self {
        self.request.auto_stop_interval = minutes;
        self
    }

    /// Set the auto-archive interval in minutes.
    pub fn auto_archive_minutes(mut self, minutes: u32) -> Self {
        self.request.auto_archive_interval = minutes;
        self
    }

    /// Build the request, validating the resource profile.
    pub fn build(self) -> Result<CreateSandboxRequest> {
        let r = &self.request;
        if r.image.trim().is_empty() {
            return Err(DaytonaError::Config("image is required".into()));
        }
        if r.cpu == 0 {
            return Err(DaytonaError::Config("cpu must be > 0".into()));
        }
        if r.memory == 0 {
            return Err(DaytonaError::Config("memory must be > 0".into()));
        }
        if r.disk == 0 {
            return Err(DaytonaError::Config("disk must be > 0".into()));
        }
        Ok(self.request)
    }
}

/// Body of `POST /toolbox/{id}/toolbox/process/session`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateSessionRequest<'a> {
    pub session_id: &'a str,
}

/// Body of `POST /toolbox/{id}/toolbox/process/session/{session}/exec`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExecRequest {
    pub command: String,
    pub run_async: bool,
    /// Legacy spelling of `run_async`.
    #[serde(rename = "async")]
    legacy_async: bool,
}

impl SessionExecRequest {
    /// A command that waits for completion.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            run_async: false,
            legacy_async: false,
        }
    }

    /// Return as soon as the command is accepted.
    pub fn run_async(mut self, run_async: bool) -> Self {
        self.run_async = run_async;
        self.legacy_async = run_async;
        self
    }
}
