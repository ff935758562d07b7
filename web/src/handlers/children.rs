//! Child profile endpoints. Every route acts on the caller's own children.

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::state::AppState;
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use only4kiddos_core::{Child, ChildId, ChildPatch, NewChild};
use uuid::Uuid;

/// The caller's children, sorted by name.
pub async fn list_children(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
) -> Result<Json<Vec<Child>>, AppError> {
    Ok(Json(state.services.children.list(&auth).await?))
}

/// Add a child profile.
pub async fn create_child(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    payload: Result<Json<NewChild>, JsonRejection>,
) -> Result<(StatusCode, Json<Child>), AppError> {
    let Json(details) = payload?;
    let child = state.services.children.create(&auth, details).await?;
    Ok((StatusCode::CREATED, Json(child)))
}

/// Edit a child profile.
pub async fn update_child(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ChildPatch>, JsonRejection>,
) -> Result<Json<Child>, AppError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let child = state
        .services
        .children
        .update(&auth, ChildId::from_uuid(id), patch)
        .await?;
    Ok(Json(child))
}

/// Remove a child profile.
pub async fn delete_child(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state
        .services
        .children
        .delete(&auth, ChildId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
