//! Client configuration for the Daytona API.

use crate::error::{DaytonaError, Result};
use std::time::Duration;

/// Default Daytona API base URL.
pub const DEFAULT_SERVER_URL: &str = "https://app.daytona.io/api";

/// Default target region.
pub const DEFAULT_TARGET: &str = "us";

/// Connection settings for a [`DaytonaClient`](crate::DaytonaClient).
#[derive(Clone)]
pub struct DaytonaConfig {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Base URL of the Daytona API (e.g. `https://app.daytona.io/api`).
    pub server_url: String,
    /// Target region new sandboxes are placed in.
    pub target: String,
    /// Timeout applied to every request (default: 60s).
    pub request_timeout: Duration,
}

impl std::fmt::Debug for DaytonaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaytonaConfig")
            .field("api_key", &redact(&self.api_key))
            .field("server_url", &self.server_url)
            .field("target", &self.target)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl Default for DaytonaConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            target: DEFAULT_TARGET.to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl DaytonaConfig {
    /// Create a configuration with the given credentials and endpoint.
    pub fn new(
        api_key: impl Into<String>,
        server_url: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            server_url: server_url.into(),
            target: target.into(),
            ..Default::default()
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check that all required values are present and the URL parses.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(DaytonaError::Config("api_key is required".into()));
        }
        if self.server_url.trim().is_empty() {
            return Err(DaytonaError::Config("server_url is required".into()));
        }
        if self.target.trim().is_empty() {
            return Err(DaytonaError::Config("target is required".into()));
        }
        let url = reqwest::Url::parse(&self.server_url)
            .map_err(|e| DaytonaError::Config(format!("invalid server_url: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DaytonaError::Config(format!(
                "server_url must be http(s), got {}",
                url.scheme()
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(DaytonaError::Config("request_timeout must be > 0".into()));
        }
        Ok(())
    }

    /// Base URL without a trailing slash, ready for path concatenation.
    pub(crate) fn base_url(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }
}
