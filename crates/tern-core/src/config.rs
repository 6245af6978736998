//! Provider configuration.
//!
//! Loaded once at process start and shared read-only by every provider.

use crate::error::CoreError;
use crate::runtime::RuntimeKind;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tern_daytona::{DaytonaConfig, DEFAULT_SERVER_URL, DEFAULT_TARGET};

/// Default sandbox image.
pub const DEFAULT_IMAGE: &str = "kortix/suna:0.1.3";

/// Default bootstrap command: the sandbox's process supervisor.
pub const DEFAULT_ENTRYPOINT: &str =
    "/usr/bin/supervisord -n -c /etc/supervisor/conf.d/supervisord.conf";

/// Default working directory of the local stub.
pub const DEFAULT_LOCAL_BASE_PATH: &str = "/tmp/tern-sandbox";

/// Resource profile requested for every remote sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxResources {
    /// vCPU count (default: 2).
    pub cpu: u32,
    /// Memory in GiB (default: 4).
    pub memory_gib: u32,
    /// Disk in GiB (default: 5).
    pub disk_gib: u32,
}

impl Default for SandboxResources {
    fn default() -> Self {
        Self {
            cpu: 2,
            memory_gib: 4,
            disk_gib: 5,
        }
    }
}

/// Process-wide provider configuration.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Runtime selected at startup.
    pub default_runtime: RuntimeKind,
    /// Daytona API key.
    pub daytona_api_key: String,
    /// Daytona API base URL.
    pub daytona_server_url: String,
    /// Daytona target region.
    pub daytona_target: String,
    /// Container image for new sandboxes.
    pub image: String,
    /// Command the bootstrap session runs (without the leading `exec`).
    pub entrypoint: String,
    /// Resource profile for new sandboxes.
    pub resources: SandboxResources,
    /// Minutes of inactivity before the backend stops a sandbox.
    pub auto_stop_minutes: u32,
    /// Minutes a stopped sandbox waits before being archived.
    pub auto_archive_minutes: u32,
    /// Pause between restarting a sandbox and re-checking its state.
    pub restart_settle: Duration,
    /// How long `create` waits for a new sandbox to report `started`.
    pub ready_timeout: Duration,
    /// Timeout for each backend request.
    pub request_timeout: Duration,
    /// Directory the local stub runs commands in.
    pub local_base_path: PathBuf,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("default_runtime", &self.default_runtime)
            .field("daytona_api_key_set", &!self.daytona_api_key.is_empty())
            .field("daytona_server_url", &self.daytona_server_url)
            .field("daytona_target", &self.daytona_target)
            .field("image", &self.image)
            .field("entrypoint", &self.entrypoint)
            .field("resources", &self.resources)
            .field("auto_stop_minutes", &self.auto_stop_minutes)
            .field("auto_archive_minutes", &self.auto_archive_minutes)
            .field("restart_settle", &self.restart_settle)
            .field("ready_timeout", &self.ready_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("local_base_path", &self.local_base_path)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            default_runtime: RuntimeKind::Daytona,
            daytona_api_key: String::new(),
            daytona_server_url: DEFAULT_SERVER_URL.to_string(),
            daytona_target: DEFAULT_TARGET.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            entrypoint: DEFAULT_ENTRYPOINT.to_string(),
            resources: SandboxResources::default(),
            auto_stop_minutes: 15,
            auto_archive_minutes: 24 * 60,
            restart_settle: Duration::from_secs(5),
            ready_timeout: Duration::from_secs(120),
            request_timeout: Duration::from_secs(60),
            local_base_path: PathBuf::from(DEFAULT_LOCAL_BASE_PATH),
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `SANDBOX_RUNTIME` | `daytona` (`daytona`, `e2b`) |
    /// | `DAYTONA_API_KEY` | empty |
    /// | `DAYTONA_SERVER_URL` | `https://app.daytona.io/api` |
    /// | `DAYTONA_TARGET` | `us` |
    /// | `SANDBOX_IMAGE_NAME` | `kortix/suna:0.1.3` |
    /// | `SANDBOX_ENTRYPOINT` | supervisord in foreground |
    /// | `SANDBOX_CPU` | `2` |
    /// | `SANDBOX_MEMORY_GIB` | `4` |
    /// | `SANDBOX_DISK_GIB` | `5` |
    /// | `SANDBOX_AUTO_STOP_MINUTES` | `15` |
    /// | `SANDBOX_AUTO_ARCHIVE_MINUTES` | `1440` |
    /// | `SANDBOX_RESTART_SETTLE_SECS` | `5` |
    /// | `SANDBOX_READY_TIMEOUT_SECS` | `120` |
    /// | `SANDBOX_REQUEST_TIMEOUT_SECS` | `60` |
    /// | `E2B_BASE_PATH` | `/tmp/tern-sandbox` |
    ///
    /// Unparseable numbers fall back to their defaults. An unknown
    /// `SANDBOX_RUNTIME` is an error rather than a silent fallback.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let num = |key: &str, fallback: u32| {
            var(key)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(fallback)
        };
        let secs = |key: &str, fallback: Duration| {
            var(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(fallback)
        };

        let default_runtime = match var("SANDBOX_RUNTIME") {
            Some(name) => name.parse::<RuntimeKind>()?,
            None => default.default_runtime,
        };

        Ok(Self {
            default_runtime,
            daytona_api_key: var("DAYTONA_API_KEY").unwrap_or(default.daytona_api_key),
            daytona_server_url: var("DAYTONA_SERVER_URL").unwrap_or(default.daytona_server_url),
            daytona_target: var("DAYTONA_TARGET").unwrap_or(default.daytona_target),
            image: var("SANDBOX_IMAGE_NAME").unwrap_or(default.image),
            entrypoint: var("SANDBOX_ENTRYPOINT").unwrap_or(default.entrypoint),
            resources: SandboxResources {
                cpu: num("SANDBOX_CPU", default.resources.cpu),
                memory_gib: num("SANDBOX_MEMORY_GIB", default.resources.memory_gib),
                disk_gib: num("SANDBOX_DISK_GIB", default.resources.disk_gib),
            },
            auto_stop_minutes: num("SANDBOX_AUTO_STOP_MINUTES", default.auto_stop_minutes),
            auto_archive_minutes: num("SANDBOX_AUTO_ARCHIVE_MINUTES", default.auto_archive_minutes),
            restart_settle: secs("SANDBOX_RESTART_SETTLE_SECS", default.restart_settle),
            ready_timeout: secs("SANDBOX_READY_TIMEOUT_SECS", default.ready_timeout),
            request_timeout: secs("SANDBOX_REQUEST_TIMEOUT_SECS", default.request_timeout),
            local_base_path: var("E2B_BASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(default.local_base_path),
        })
    }

    /// Connection settings for the Daytona client.
    pub fn daytona_config(&self) -> DaytonaConfig {
        DaytonaConfig::new(
            &self.daytona_api_key,
            &self.daytona_server_url,
            &self.daytona_target,
        )
        .with_timeout(self.request_timeout)
    }

    /// Whether `runtime` has everything it needs to operate.
    ///
    /// Applies the same checks provider construction does, so a configured
    /// runtime can always be built. Never fails: an unconfigured runtime is a
    /// normal, reportable state.
    pub fn is_configured(&self, runtime: RuntimeKind) -> bool {
        match runtime {
            RuntimeKind::Daytona => self.daytona_config().validate().is_ok(),
            RuntimeKind::E2b => true,
        }
    }

    /// Redacted view of the settings `runtime` reads.
    pub fn summary(&self, runtime: RuntimeKind) -> serde_json::Value {
        match runtime {
            RuntimeKind::Daytona => json!({
                "api_key_set": !self.daytona_api_key.trim().is_empty(),
                "server_url": self.daytona_server_url,
                "target": self.daytona_target,
                "image": self.image,
                "entrypoint": self.entrypoint,
                "cpu": self.resources.cpu,
                "memory_gib": self.resources.memory_gib,
                "disk_gib": self.resources.disk_gib,
            }),
            RuntimeKind::E2b => json!({
                "base_path": self.local_base_path.display().to_string(),
            }),
        }
    }

    /// Set the Daytona credentials and endpoint.
    pub fn with_daytona(
        mut self,
        api_key: impl Into<String>,
        server_url: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.daytona_api_key = api_key.into();
        self.daytona_server_url = server_url.into();
        self.daytona_target = target.into();
        self
    }

    /// Set the runtime selected at startup.
    pub fn with_default_runtime(mut self, runtime: RuntimeKind) -> Self {
        self.default_runtime = runtime;
        self
    }

    /// Set the local stub's working directory.
    pub fn with_local_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_base_path = path.into();
        self
    }

    /// Set the restart settle delay.
    pub fn with_restart_settle(mut self, settle: Duration) -> Self {
        self.restart_settle = settle;
        self
    }

    /// Set how long `create` waits for a new sandbox to start.
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.default_runtime, RuntimeKind::Daytona);
        assert_eq!(config.resources, SandboxResources { cpu: 2, memory_gib: 4, disk_gib: 5 });
        assert_eq!(config.restart_settle, Duration::from_secs(5));
        assert_eq!(config.image, DEFAULT_IMAGE);
        assert!(!config.is_configured(RuntimeKind::Daytona));
        assert!(config.is_configured(RuntimeKind::E2b));
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let config = ProviderConfig::from_lookup(lookup(&[
            ("SANDBOX_RUNTIME", "e2b"),
            ("DAYTONA_API_KEY", "key"),
            ("DAYTONA_SERVER_URL", "https://daytona.example.com/api"),
            ("DAYTONA_TARGET", "eu"),
            ("SANDBOX_CPU", "4"),
            ("SANDBOX_RESTART_SETTLE_SECS", "1"),
            ("SANDBOX_READY_TIMEOUT_SECS", "30"),
            ("E2B_BASE_PATH", "/srv/work"),
        ]))
        .unwrap();

        assert_eq!(config.default_runtime, RuntimeKind::E2b);
        assert_eq!(config.daytona_target, "eu");
        assert_eq!(config.resources.cpu, 4);
        assert_eq!(config.resources.memory_gib, 4);
        assert_eq!(config.restart_settle, Duration::from_secs(1));
        assert_eq!(config.ready_timeout, Duration::from_secs(30));
        assert_eq!(config.local_base_path, PathBuf::from("/srv/work"));
        assert!(config.is_configured(RuntimeKind::Daytona));
    }

    #[test]
    fn test_from_lookup_bad_numbers_use_defaults() {
        let config =
            ProviderConfig::from_lookup(lookup(&[("SANDBOX_DISK_GIB", "lots")])).unwrap();
        assert_eq!(config.resources.disk_gib, 5);
    }

    #[test]
    fn test_from_lookup_rejects_unknown_runtime() {
        let result = ProviderConfig::from_lookup(lookup(&[("SANDBOX_RUNTIME", "docker")]));
        assert!(matches!(result, Err(CoreError::UnknownRuntime { .. })));
    }

    #[test]
    fn test_daytona_needs_all_three_values() {
        let base = ProviderConfig::default().with_daytona("key", "https://x.example", "us");
        assert!(base.is_configured(RuntimeKind::Daytona));

        let mut missing_target = base.clone();
        missing_target.daytona_target = String::new();
        assert!(!missing_target.is_configured(RuntimeKind::Daytona));

        let mut missing_url = base;
        missing_url.daytona_server_url = " ".into();
        assert!(!missing_url.is_configured(RuntimeKind::Daytona));
    }

    #[test]
    fn test_daytona_rejects_what_the_client_rejects() {
        let bad_url = ProviderConfig::default().with_daytona("key", "not a url", "us");
        assert!(!bad_url.is_configured(RuntimeKind::Daytona));

        let bad_scheme = ProviderConfig::default().with_daytona("key", "ftp://x.example", "us");
        assert!(!bad_scheme.is_configured(RuntimeKind::Daytona));

        let zero_timeout = ProviderConfig::from_lookup(lookup(&[
            ("DAYTONA_API_KEY", "key"),
            ("SANDBOX_REQUEST_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();
        assert!(!zero_timeout.is_configured(RuntimeKind::Daytona));
    }

    #[test]
    fn test_summary_never_leaks_key() {
        let config = ProviderConfig::default().with_daytona("secret-key", "https://x.example", "us");
        let summary = config.summary(RuntimeKind::Daytona);
        assert_eq!(summary["api_key_set"], true);
        assert!(!summary.to_string().contains("secret-key"));
        assert!(!format!("{config:?}").contains("secret-key"));
    }
}
