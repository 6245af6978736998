//! Runtime selection and provider registry.

use crate::config::ProviderConfig;
use crate::daytona::DaytonaProvider;
use crate::e2b::E2BProvider;
use crate::error::{CoreError, Result};
use crate::provider::SandboxProvider;
use crate::runtime::{RuntimeInfo, RuntimeKind, RuntimeProbe, SwitchOutcome};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Owns the process-wide runtime selection and one provider per runtime.
///
/// # Thread Safety
///
/// Reading the selection never blocks. Switches are serialised by an async
/// mutex and only ever publish a runtime that passed validation, so readers
/// can't observe an unconfigured selection. Providers are built on first use
/// and shared; a failed construction is not cached.
pub struct RuntimeManager {
    config: ProviderConfig,
    current: AtomicU8,
    switch_lock: Mutex<()>,
    providers: [OnceCell<Arc<dyn SandboxProvider>>; 2],
}

impl RuntimeManager {
    /// Create a manager selecting the configured default runtime.
    pub fn new(config: ProviderConfig) -> Self {
        let runtime = config.default_runtime;
        tracing::info!(
            runtime = %runtime,
            configured = config.is_configured(runtime),
            "Creating runtime manager"
        );
        Self {
            current: AtomicU8::new(runtime.index() as u8),
            switch_lock: Mutex::new(()),
            providers: [OnceCell::new(), OnceCell::new()],
            config,
        }
    }

    /// Pre-register the provider for its runtime instead of building it lazily.
    pub fn with_provider(mut self, provider: Arc<dyn SandboxProvider>) -> Self {
        let index = provider.runtime().index();
        self.providers[index] = OnceCell::from(provider);
        self
    }

    /// Get the configuration providers are built from.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Currently selected runtime.
    pub fn current_runtime(&self) -> RuntimeKind {
        RuntimeKind::from_index(self.current.load(Ordering::Acquire))
    }

    /// Every registered runtime, configured or not.
    pub fn available_runtimes(&self) -> Vec<RuntimeKind> {
        RuntimeKind::ALL.to_vec()
    }

    pub fn get_runtime_info(&self) -> RuntimeInfo {
        RuntimeInfo {
            runtime: self.current_runtime(),
            available_runtimes: self.available_runtimes(),
        }
    }

    /// Whether the selected runtime is configured.
    pub fn validate_runtime_config(&self) -> bool {
        self.validate_runtime_config_for(self.current_runtime())
    }

    /// Whether `runtime` is configured. Pure; never touches the selection.
    pub fn validate_runtime_config_for(&self, runtime: RuntimeKind) -> bool {
        self.config.is_configured(runtime)
    }

    /// Redacted view of the settings `runtime` reads.
    pub fn configuration_summary(&self, runtime: RuntimeKind) -> serde_json::Value {
        self.config.summary(runtime)
    }

    /// Select the runtime called `name`.
    ///
    /// Unknown names fail with [`CoreError::UnknownRuntime`] before anything
    /// changes. A runtime that fails validation is rejected with
    /// [`CoreError::InvalidRuntime`] and the previous selection stays.
    pub async fn switch_runtime(&self, name: &str) -> Result<SwitchOutcome> {
        let candidate: RuntimeKind = name.parse()?;

        let _guard = self.switch_lock.lock().await;
        let previous = self.current_runtime();
        if !self.validate_runtime_config_for(candidate) {
            tracing::warn!(
                previous = %previous,
                candidate = %candidate,
                "Rejected switch to unconfigured runtime"
            );
            return Err(CoreError::InvalidRuntime(candidate));
        }

        self.current.store(candidate.index() as u8, Ordering::Release);
        tracing::info!(previous = %previous, current = %candidate, "Switched runtime");
        Ok(SwitchOutcome {
            previous,
            current: candidate,
        })
    }

    /// Check any registered runtime without selecting it.
    pub fn probe_runtime(&self, name: &str) -> Result<RuntimeProbe> {
        let runtime: RuntimeKind = name.parse()?;
        Ok(RuntimeProbe {
            runtime,
            is_configured: self.validate_runtime_config_for(runtime),
            configuration: self.configuration_summary(runtime),
        })
    }

    /// Get the provider for `runtime`, building it on first use.
    pub async fn provider_for(&self, runtime: RuntimeKind) -> Result<Arc<dyn SandboxProvider>> {
        let provider = self.providers[runtime.index()]
            .get_or_try_init(|| async { self.build_provider(runtime) })
            .await?;
        Ok(Arc::clone(provider))
    }

    /// Get the provider for the selected runtime.
    pub async fn active_provider(&self) -> Result<Arc<dyn SandboxProvider>> {
        self.provider_for(self.current_runtime()).await
    }

    fn build_provider(&self, runtime: RuntimeKind) -> Result<Arc<dyn SandboxProvider>> {
        tracing::debug!(runtime = %runtime, "Building provider");
        let provider: Arc<dyn SandboxProvider> = match runtime {
            RuntimeKind::Daytona => Arc::new(DaytonaProvider::new(&self.config).map_err(|e| {
                tracing::error!(runtime = %runtime, error = %e, "Provider construction failed");
                e
            })?),
            RuntimeKind::E2b => Arc::new(E2BProvider::new(&self.config)),
        };
        Ok(provider)
    }
}
