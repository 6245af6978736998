//! Configuration for the administration server.
//!
//! Configuration is loaded from environment variables with sensible defaults.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tern_core::{CoreError, ProviderConfig, RuntimeKind};

/// Configuration for the Tern server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server bind address.
    pub http_addr: SocketAddr,

    /// Settings shared by every sandbox provider.
    pub provider: ProviderConfig,
}

/// Configuration loading or validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Provider(#[from] CoreError),

    #[error("selected runtime '{0}' is not configured")]
    RuntimeNotConfigured(RuntimeKind),

    #[error("base path is not a directory: {0}")]
    InvalidBasePath(String),
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080),
            provider: ProviderConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `TERN_HTTP_HOST` | `0.0.0.0` |
    /// | `TERN_HTTP_PORT` | `8080` |
    ///
    /// Provider settings are read by [`ProviderConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_host: IpAddr = lookup("TERN_HTTP_HOST")
            .and_then(|v| v.parse().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        let http_port: u16 = lookup("TERN_HTTP_PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        Ok(Self {
            http_addr: SocketAddr::new(http_host, http_port),
            provider: ProviderConfig::from_lookup(&lookup)?,
        })
    }

    /// Check that the startup runtime can actually be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let runtime = self.provider.default_runtime;
        if !self.provider.is_configured(runtime) {
            return Err(ConfigError::RuntimeNotConfigured(runtime));
        }

        let base = &self.provider.local_base_path;
        if runtime == RuntimeKind::E2b && base.exists() && !base.is_dir() {
            return Err(ConfigError::InvalidBasePath(base.display().to_string()));
        }

        Ok(())
    }

    /// Validate configuration but only log warnings instead of failing.
    ///
    /// Use this for development environments where credentials may not be
    /// set yet; the health endpoint keeps reporting the problem.
    pub fn validate_warn(&self) {
        if let Err(e) = self.validate() {
            tracing::warn!(error = %e, "Startup runtime is not usable yet");
        }

        for runtime in RuntimeKind::ALL {
            if runtime != self.provider.default_runtime && !self.provider.is_configured(runtime) {
                tracing::warn!(runtime = %runtime, "Runtime not configured; switching to it will fail");
            }
        }
    }
}
