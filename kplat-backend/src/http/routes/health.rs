//! Liveness and readiness endpoints
//!
//! `/health` never touches the database. `/ready` probes it on every call and
//! folds the result into the readiness gate.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use kplat_core::ReadinessState;
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
        service: "backend",
    })
}

/// GET /ready
async fn ready(State(state): State<AppState>) -> Response {
    let db = state.db();
    let (readiness, probe) = state
        .readiness()
        .check(db.probe(db.probe_timeout()))
        .await;

    match probe {
        Ok(pool) => Json(json!({
            "status": "ready",
            "database": "connected",
            "pool_available": pool.available,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, ?readiness, "Readiness check failed");
            not_ready(readiness, e.to_string())
        }
    }
}

fn not_ready(readiness: ReadinessState, reason: String) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "status": readiness,
            "database": "disconnected",
            "detail": reason,
        })),
    )
        .into_response()
}

/// Health routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}
