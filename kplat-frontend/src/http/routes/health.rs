//! Liveness and readiness endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "frontend",
    })
}

/// GET /ready - one unretried probe of the backend's `/health`
async fn ready(State(state): State<AppState>) -> Response {
    let timeout = state.ready_probe_timeout();
    let (readiness, probe) = state
        .readiness()
        .check(state.backend().probe(timeout))
        .await;

    match probe {
        Ok(()) => Json(json!({"status": "ready", "backend": "connected"})).into_response(),
        Err(e) => {
            let backend = if e.upstream_status().is_some() {
                "unhealthy"
            } else {
                "unreachable"
            };
            tracing::warn!(error = %e, ?readiness, "Backend readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": readiness, "backend": backend})),
            )
                .into_response()
        }
    }
}

/// Health routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}
