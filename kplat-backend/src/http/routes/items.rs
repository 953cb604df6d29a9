//! Item endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{routing::get, Json, Router};
use kplat_core::http::request_id;
use serde::Serialize;

use crate::db::repos::ItemRepo;
use crate::http::error::ApiError;
use crate::models::{CreateItemRequest, Item, NewItem};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ItemsResponse {
    pub data: Vec<Item>,
}

/// GET /data - all items ordered by id
async fn list_items(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ItemsResponse>, ApiError> {
    let request_id = request_id(&headers);
    tracing::info!(request_id, "Fetching data from items table");

    let data = ItemRepo::new(state.db()).list().await?;

    tracing::info!(request_id, count = data.len(), "Fetched items");
    Ok(Json(ItemsResponse { data }))
}

/// POST /data - create an item
async fn create_item(
    State(state): State<AppState>,
    body: Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let Json(req) = body?;
    let item = NewItem::try_from(req)?;
    let created = ItemRepo::new(state.db()).insert(&item).await?;

    tracing::info!(id = created.id, name = %created.name, "Item created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Item routes
pub fn router() -> Router<AppState> {
    Router::new().route("/data", get(list_items).post(create_item))
}
