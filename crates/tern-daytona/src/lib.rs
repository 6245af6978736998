//! # tern-daytona
//!
//! Async client for the Daytona sandbox backend.
//! Provides typed access to the control plane (create, fetch, start, delete)
//! and to the toolbox session API used to run commands inside a sandbox.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tern_daytona::{CreateSandboxRequest, DaytonaClient, DaytonaConfig, SandboxApi, SessionExecRequest};
//!
//! # async fn example() -> tern_daytona::Result<()> {
//! let client = DaytonaClient::new(DaytonaConfig::new(
//!     "dtn_api_key",
//!     "https://app.daytona.io/api",
//!     "us",
//! ))?;
//!
//! let request = CreateSandboxRequest::builder("kortix/suna:0.1.3")
//!     .public(true)
//!     .build()?;
//! let sandbox = client.create_sandbox(&request).await?;
//!
//! client.create_session(&sandbox.id, "default").await?;
//! let reply = client
//!     .execute_session_command(&sandbox.id, "default", &SessionExecRequest::new("uname -a"))
//!     .await?;
//! println!("{:?}", reply.output);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Lifecycle**: Create, fetch, list-by-label, start, and delete sandboxes
//! - **Sessions**: Idempotent session creation and sync/async command submission
//! - **Typed States**: `SandboxState` covers every state the control plane reports
//! - **Testable Seam**: `SandboxApi` trait for in-memory backends

mod client;
mod config;
mod error;
mod models;
mod request;

pub use client::{DaytonaClient, SandboxApi};
pub use config::{DaytonaConfig, DEFAULT_SERVER_URL, DEFAULT_TARGET};
pub use error::{DaytonaError, Result};
pub use models::{Sandbox, SandboxState, SessionExecResponse};
pub use request::{CreateSandboxBuilder, CreateSandboxRequest, SessionExecRequest};
