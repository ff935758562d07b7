//! Event catalog endpoints.
//!
//! - `GET /api/events` - filtered, paginated catalog
//! - `GET /api/events/:id` - one event with live availability
//! - `GET /api/events/:id/availability` - ledger counters
//! - `POST /api/events` - publish (host or admin)
//! - `PATCH /api/events/:id` - edit (creator or admin)
//! - `DELETE /api/events/:id` - remove (creator or admin)

use crate::error::AppError;
use crate::extractors::{CurrentUser, MaybeUser};
use crate::state::AppState;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use only4kiddos_core::event::MAX_CHILD_AGE;
use only4kiddos_core::filter::DEFAULT_LIMIT;
use only4kiddos_core::{
    AgeRange, DateRange, EventCategory, EventFilter, EventId, EventPatch, EventView, Money,
    NewEvent, Page, PriceRange,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query string of `GET /api/events`.
///
/// Ranges may be given by one bound only; the other defaults to the widest
/// value. Prices are in cents.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListQuery {
    /// Comma-separated categories
    pub categories: Option<String>,
    /// Youngest age of interest
    pub min_age: Option<u8>,
    /// Oldest age of interest
    pub max_age: Option<u8>,
    /// Lowest price
    pub min_price: Option<u64>,
    /// Highest price
    pub max_price: Option<u64>,
    /// Earliest event date
    pub from: Option<DateTime<Utc>>,
    /// Latest event date
    pub to: Option<DateTime<Utc>>,
    /// Free-text search
    pub q: Option<String>,
    /// Page size
    pub limit: Option<u32>,
    /// Items to skip
    pub offset: Option<u32>,
}

impl EventListQuery {
    /// Convert into a catalog filter.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown category.
    pub fn into_filter(self) -> Result<EventFilter, AppError> {
        let categories = self
            .categories
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(parse_category)
            .collect::<Result<Vec<_>, _>>()?;

        let age_range = (self.min_age.is_some() || self.max_age.is_some()).then(|| AgeRange {
            min: self.min_age.unwrap_or(0),
            max: self.max_age.unwrap_or(MAX_CHILD_AGE),
        });
        let price_range =
            (self.min_price.is_some() || self.max_price.is_some()).then(|| PriceRange {
                min: self.min_price.map_or(Money::ZERO, Money::from_cents),
                max: Money::from_cents(self.max_price.unwrap_or(u64::MAX)),
            });
        let date_range = (self.from.is_some() || self.to.is_some()).then(|| DateRange {
            start: self.from.unwrap_or(DateTime::<Utc>::MIN_UTC),
            end: self.to.unwrap_or(DateTime::<Utc>::MAX_UTC),
        });

        Ok(EventFilter {
            categories,
            age_range,
            price_range,
            date_range,
            search_query: self.q,
            limit: self.limit.unwrap_or(DEFAULT_LIMIT),
            offset: self.offset.unwrap_or(0),
        })
    }
}

fn parse_category(name: &str) -> Result<EventCategory, AppError> {
    serde_json::from_value(serde_json::Value::String(name.to_ascii_lowercase()))
        .map_err(|_| AppError::validation(format!("Unknown category: {name}")))
}

/// Ledger counters for one event.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    /// Event ID
    pub event_id: EventId,
    /// Fixed capacity
    pub capacity: u32,
    /// Spots still available
    pub spots_left: u32,
    /// Spots held by bookings
    pub reserved: u32,
}

/// List events.
///
/// ```bash
/// curl 'http://localhost:3001/api/events?categories=sports,arts&minAge=6&limit=10'
/// ```
pub async fn list_events(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    query: Result<Query<EventListQuery>, QueryRejection>,
) -> Result<Json<Page<EventView>>, AppError> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    let page = state
        .services
        .catalog
        .list(&filter, viewer.as_ref())
        .await?;
    Ok(Json(page))
}

/// Get one event.
pub async fn get_event(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<EventView>, AppError> {
    let Path(id) = id?;
    let view = state
        .services
        .catalog
        .get(EventId::from_uuid(id), viewer.as_ref())
        .await?;
    Ok(Json(view))
}

/// Live capacity counters of one event.
pub async fn get_availability(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let Path(id) = id?;
    let inventory = state
        .services
        .catalog
        .availability(EventId::from_uuid(id))
        .await?;
    Ok(Json(AvailabilityResponse {
        event_id: inventory.event_id(),
        capacity: inventory.capacity().get(),
        spots_left: inventory.spots_left(),
        reserved: inventory.reserved(),
    }))
}

/// Publish an event. The caller becomes its creator.
///
/// ```bash
/// curl -X POST http://localhost:3001/api/events \
///   -H "Authorization: Bearer <token>" \
///   -H "Content-Type: application/json" \
///   -d '{"title": "Story Time", "capacity": 12, ...}'
/// ```
pub async fn create_event(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    payload: Result<Json<NewEvent>, JsonRejection>,
) -> Result<(StatusCode, Json<EventView>), AppError> {
    let Json(details) = payload?;
    let view = state.services.catalog.create(&auth, details).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Edit an event. Capacity cannot change.
pub async fn update_event(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<EventPatch>, JsonRejection>,
) -> Result<Json<EventView>, AppError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let view = state
        .services
        .catalog
        .update(&auth, EventId::from_uuid(id), patch)
        .await?;
    Ok(Json(view))
}

/// Delete an event and close its inventory.
pub async fn delete_event(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state
        .services
        .catalog
        .delete(&auth, EventId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
