//! Proxied data endpoints

use axum::extract::State;
use axum::http::HeaderMap;
use axum::{routing::get, Json, Router};
use kplat_core::http::request_id;
use serde::Serialize;
use serde_json::Value;

use crate::http::error::ProxyError;
use crate::state::AppState;

const GREETING: &str = "Hello from kplat!";

#[derive(Serialize)]
pub struct HomeResponse {
    pub frontend: &'static str,
    pub backend: Value,
}

/// GET / - greeting plus the backend's `/data`
async fn home(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<HomeResponse>, ProxyError> {
    let request_id = request_id(&headers);
    tracing::info!(request_id, "Home endpoint called");

    let backend = state
        .backend()
        .get_json::<Value>("/data", request_id)
        .await
        .map_err(|e| ProxyError::new(e, request_id))?;

    tracing::info!(request_id, "Fetched data from backend");
    Ok(Json(HomeResponse {
        frontend: GREETING,
        backend,
    }))
}

/// GET /clubs - backend `/footballClub`, body unchanged
async fn clubs(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ProxyError> {
    let request_id = request_id(&headers);
    tracing::info!(request_id, "Clubs endpoint called");

    let body = state
        .backend()
        .get_json::<Value>("/footballClub", request_id)
        .await
        .map_err(|e| ProxyError::new(e, request_id))?;

    Ok(Json(body))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/clubs", get(clubs))
}
