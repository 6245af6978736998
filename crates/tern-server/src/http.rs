//! HTTP transport for the administration API.
//!
//! ## Endpoints
//!
//! - `GET /api/runtime/status` - Current runtime and configuration state
//! - `POST /api/runtime/switch` - Select another runtime
//! - `GET /api/runtime/validate/:runtime` - Check a runtime without selecting it
//! - `GET /api/runtime/health` - Runtime health (always 200)
//! - `GET /health` - Liveness

use crate::error::ApiError;
use crate::server::TernServer;
use crate::types::{HealthResponse, StatusResponse, SwitchRequest, SwitchResponse};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use tern_core::RuntimeProbe;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the HTTP router.
///
/// The returned router can be served directly with axum or composed
/// into a larger application.
pub fn build_router(server: TernServer) -> Router {
    tracing::debug!("Building HTTP router");

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/runtime/status", get(status_handler))
        .route("/api/runtime/switch", post(switch_handler))
        .route("/api/runtime/validate/:runtime", get(validate_handler))
        .route("/api/runtime/health", get(runtime_health_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Liveness endpoint.
async fn health_handler() -> impl IntoResponse {
    tracing::trace!("Health check request");
    Json(serde_json::json!({
        "status": "healthy",
        "service": "tern-server"
    }))
}

async fn status_handler(
    State(server): State<TernServer>,
) -> Result<Json<StatusResponse>, ApiError> {
    Ok(Json(server.status()?))
}

async fn switch_handler(
    State(server): State<TernServer>,
    body: Result<Json<SwitchRequest>, JsonRejection>,
) -> Result<Json<SwitchResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::InvalidInput(e.body_text()))?;
    Ok(Json(server.switch(&request.runtime).await?))
}

async fn validate_handler(
    State(server): State<TernServer>,
    Path(runtime): Path<String>,
) -> Result<Json<RuntimeProbe>, ApiError> {
    Ok(Json(server.validate(&runtime)?))
}

async fn runtime_health_handler(State(server): State<TernServer>) -> Json<HealthResponse> {
    Json(server.health())
}

/// Start the HTTP server.
///
/// This function runs until the server is shut down via the provided
/// shutdown signal.
pub async fn serve(
    server: TernServer,
    addr: std::net::SocketAddr,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let router = build_router(server);

    tracing::info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::debug!(%addr, "TCP listener bound");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
