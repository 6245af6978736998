//! # tern-core
//!
//! Sandbox provider abstraction and runtime management for Tern.
//!
//! Callers provision sandboxes and run commands through a [`SandboxProvider`]
//! without knowing which backend serves them. The [`RuntimeManager`] owns
//! the process-wide choice of backend and can switch it at run time.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       tern-core                          │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  ┌─────────────────────┐                                 │
//! │  │   RuntimeManager    │  current runtime (atomic)       │
//! │  │  - switch_runtime() │  switch lock (async mutex)      │
//! │  │  - probe_runtime()  │                                 │
//! │  │  - active_provider()│                                 │
//! │  └─────────────────────┘                                 │
//! │           │ lazily built, cached                         │
//! │           ▼                                              │
//! │  ┌─────────────────┐     ┌──────────────────────────┐   │
//! │  │ DaytonaProvider │────▶│  SandboxApi              │   │
//! │  │                 │     │  (from tern-daytona)     │   │
//! │  └─────────────────┘     └──────────────────────────┘   │
//! │  ┌─────────────────┐                                     │
//! │  │  E2BProvider    │────▶ sh -c in a local directory     │
//! │  └─────────────────┘                                     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use tern_core::{generate_password, ExecRequest, ProviderConfig, RuntimeManager};
//!
//! # async fn example() -> tern_core::Result<()> {
//! let manager = RuntimeManager::new(ProviderConfig::from_env()?);
//!
//! let provider = manager.active_provider().await?;
//! let sandbox = provider.create(&generate_password(), Some("project-1")).await?;
//!
//! let result = provider.exec(&sandbox, &ExecRequest::new("ls -la /")).await?;
//! println!("{}", result.stdout);
//!
//! // Later, possibly after the backend put it to sleep
//! let sandbox = provider.ensure_running(sandbox.id()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Pluggable Backends**: Remote Daytona sandboxes or a local stub
//! - **Ready on Return**: `create` waits for `started` before bootstrapping
//! - **Reconciliation**: `ensure_running` restarts stopped or archived sandboxes once
//! - **Runtime Switching**: Validated, serialised switches with lock-free reads
//! - **Project Labels**: Sandboxes can be found again by project id

mod config;
mod daytona;
mod e2b;
mod error;
mod manager;
mod provider;
mod runtime;
mod sandbox;

pub use config::{
    ProviderConfig, SandboxResources, DEFAULT_ENTRYPOINT, DEFAULT_IMAGE, DEFAULT_LOCAL_BASE_PATH,
};
pub use daytona::{DaytonaProvider, BOOTSTRAP_SESSION, PROJECT_LABEL};
pub use e2b::E2BProvider;
pub use error::{CoreError, Result};
pub use manager::RuntimeManager;
pub use provider::SandboxProvider;
pub use runtime::{RuntimeInfo, RuntimeKind, RuntimeProbe, SwitchOutcome};
pub use sandbox::{
    generate_password, ExecRequest, ExecResult, ExecStatus, SandboxHandle, SandboxStatus,
    DEFAULT_SESSION,
};
