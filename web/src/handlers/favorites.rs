//! Favorite endpoints.

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::state::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use only4kiddos_booking::FavoriteToggle;
use only4kiddos_core::{EventId, EventView};
use serde::Deserialize;

/// Body of `POST /api/favorites/toggle`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFavoriteRequest {
    /// Event to add or remove
    pub event_id: EventId,
}

/// The caller's favorite events.
pub async fn list_favorites(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
) -> Result<Json<Vec<EventView>>, AppError> {
    Ok(Json(state.services.favorites.list(&auth).await?))
}

/// Add the event to the caller's favorites, or remove it if present.
pub async fn toggle_favorite(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    payload: Result<Json<ToggleFavoriteRequest>, JsonRejection>,
) -> Result<Json<FavoriteToggle>, AppError> {
    let Json(request) = payload?;
    let toggle = state
        .services
        .favorites
        .toggle(&auth, request.event_id)
        .await?;
    Ok(Json(toggle))
}
