//! Booking endpoints.
//!
//! - `GET /api/bookings` - the caller's bookings, newest first
//! - `GET /api/bookings/:id` - one booking (owner or admin)
//! - `POST /api/bookings` - reserve spots and confirm
//! - `POST /api/bookings/:id/cancel` - cancel and release the spots

use crate::error::AppError;
use crate::extractors::{CorrelationId, CurrentUser};
use crate::state::AppState;
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use only4kiddos_core::{Booking, BookingId, ChildId, EventId};
use serde::Deserialize;
use uuid::Uuid;

/// Body of `POST /api/bookings`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Event to book
    pub event_id: EventId,
    /// Children attending; one spot each
    pub child_ids: Vec<ChildId>,
}

/// The caller's bookings.
pub async fn list_bookings(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.services.bookings.list(&auth).await?))
}

/// One booking.
pub async fn get_booking(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Booking>, AppError> {
    let Path(id) = id?;
    let booking = state
        .services
        .bookings
        .get(&auth, BookingId::from_uuid(id))
        .await?;
    Ok(Json(booking))
}

/// Book an event for some of the caller's children.
///
/// Answers 409 "Not enough spots left" when the party does not fit.
///
/// ```bash
/// curl -X POST http://localhost:3001/api/bookings \
///   -H "Authorization: Bearer <token>" \
///   -H "Content-Type: application/json" \
///   -d '{"eventId": "<uuid>", "childIds": ["<uuid>", "<uuid>"]}'
/// ```
pub async fn create_booking(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    CorrelationId(correlation_id): CorrelationId,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let Json(request) = payload?;
    let booking = state
        .services
        .bookings
        .create(&auth, request.event_id, request.child_ids)
        .await?;
    tracing::info!(
        %correlation_id,
        booking_id = %booking.id,
        event_id = %booking.event_id,
        "Booking confirmed"
    );
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Cancel a booking. A second cancel answers 409.
pub async fn cancel_booking(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Booking>, AppError> {
    let Path(id) = id?;
    let booking = state
        .services
        .bookings
        .cancel(&auth, BookingId::from_uuid(id))
        .await?;
    Ok(Json(booking))
}
