//! Football club endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{routing::get, Json, Router};
use kplat_core::http::request_id;
use serde::Serialize;

use crate::db::repos::ClubRepo;
use crate::http::error::ApiError;
use crate::models::{CreateClubRequest, FootballClub, NewClub};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ClubsResponse {
    pub clubs: Vec<FootballClub>,
}

/// GET /footballClub
async fn list_clubs(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ClubsResponse>, ApiError> {
    let request_id = request_id(&headers);
    tracing::info!(request_id, "Fetching football clubs");

    let clubs = ClubRepo::new(state.db()).list().await?;

    tracing::info!(request_id, count = clubs.len(), "Fetched clubs");
    Ok(Json(ClubsResponse { clubs }))
}

/// POST /footballClub
///
/// The founding year is checked before the database is touched.
async fn create_club(
    State(state): State<AppState>,
    body: Result<Json<CreateClubRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FootballClub>), ApiError> {
    let Json(req) = body?;
    let club = NewClub::try_from(req)?;
    let created = ClubRepo::new(state.db()).insert(&club).await?;

    tracing::info!(id = created.id, name = %created.name, country = %created.country, "Club created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/footballClub", get(list_clubs).post(create_club))
}
