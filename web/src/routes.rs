//! Router configuration.

use crate::handlers::{bookings, children, events, favorites, health::health_check};
use crate::middleware::{RateLimit, correlation_id_layer, rate_limited};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Build the complete router.
///
/// `/health` sits outside the rate limit. Every route gets a correlation
/// id. CORS and request tracing are added by the binary.
pub fn build_router(state: AppState, rate_limit: RateLimit) -> Router {
    let api_routes = Router::new()
        // Catalog
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/:id",
            get(events::get_event)
                .patch(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/:id/availability", get(events::get_availability))
        // Favorites
        .route("/favorites", get(favorites::list_favorites))
        .route("/favorites/toggle", post(favorites::toggle_favorite))
        // Children
        .route(
            "/children",
            get(children::list_children).post(children::create_child),
        )
        .route(
            "/children/:id",
            patch(children::update_child).delete(children::delete_child),
        )
        // Bookings
        .route(
            "/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/bookings/:id", get(bookings::get_booking))
        .route("/bookings/:id/cancel", post(bookings::cancel_booking));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", rate_limited(api_routes, rate_limit))
        .layer(correlation_id_layer())
        .with_state(state)
}
