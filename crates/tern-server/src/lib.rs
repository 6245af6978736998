//! # tern-server
//!
//! HTTP administration surface for the Tern sandbox runtime.
//!
//! ## Quick Start
//!
//! Run the server against the local stub:
//!
//! ```bash
//! SANDBOX_RUNTIME=e2b cargo run -p tern-server
//! ```
//!
//! Configure the remote backend via environment variables:
//!
//! ```bash
//! export DAYTONA_API_KEY=dtn_...
//! export DAYTONA_SERVER_URL=https://app.daytona.io/api
//! export DAYTONA_TARGET=us
//! cargo run -p tern-server
//! ```
//!
//! ## Endpoints
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /api/runtime/status` | Current runtime, registered runtimes, configuration state |
//! | `POST /api/runtime/switch` | Select another runtime (`{"runtime": "e2b"}`) |
//! | `GET /api/runtime/validate/{runtime}` | Check a runtime without selecting it |
//! | `GET /api/runtime/health` | Health of the selected runtime |
//! | `GET /health` | Liveness |

mod config;
mod error;
pub mod http;
mod server;
mod types;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ErrorBody};
pub use server::{RuntimeAdmin, TernServer};
pub use types::*;
