//! HTTP behavior of the router, driven with `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use only4kiddos_booking::{Repositories, Services};
use only4kiddos_ledger::ReservationLedger;
use only4kiddos_testing::{fixtures, test_clock};
use only4kiddos_web::{AppState, RateLimit, StaticTokenVerifier, build_router};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const PARENT: &str = "parent-token";
const OTHER_PARENT: &str = "other-parent-token";
const HOST: &str = "host-token";
const ADMIN: &str = "admin-token";
const CLIENT_IP: &str = "192.0.2.10";

fn app_with(rate_limit: RateLimit) -> Router {
    let services = Services::new(
        Repositories::in_memory(),
        ReservationLedger::in_memory(),
        Arc::new(test_clock()),
    );
    let verifier = StaticTokenVerifier::new()
        .with_token(PARENT, fixtures::parent())
        .with_token(OTHER_PARENT, fixtures::parent_named("parent-2"))
        .with_token(HOST, fixtures::host())
        .with_token(ADMIN, fixtures::admin());
    build_router(AppState::new(services, Arc::new(verifier)), rate_limit)
}

fn app() -> Router {
    app_with(RateLimit::default())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Forwarded-For", CLIENT_IP);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn publish(app: &Router, title: &str, capacity: u32) -> String {
    let body = serde_json::to_value(fixtures::new_event(title, capacity)).unwrap();
    let (status, view) = send(app, Method::POST, "/api/events", Some(HOST), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{view}");
    view["id"].as_str().unwrap().to_string()
}

async fn add_child(app: &Router, token: &str, name: &str) -> String {
    let body = serde_json::to_value(fixtures::new_child(name, 7)).unwrap();
    let (status, child) = send(app, Method::POST, "/api/children", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{child}");
    child["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let (status, body) = send(&app(), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, Method::GET, "/api/children", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // An invalid token is not silently ignored on public routes either.
    let (status, _) = send(&app, Method::GET, "/api/events", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn booking_lifecycle_over_http() {
    let app = app();
    let event_id = publish(&app, "Art & Craft Workshop", 3).await;
    let emma = add_child(&app, PARENT, "Emma").await;
    let liam = add_child(&app, PARENT, "Liam").await;

    let (status, booking) = send(
        &app,
        Method::POST,
        "/api/bookings",
        Some(PARENT),
        Some(json!({ "eventId": event_id, "childIds": [emma, liam] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{booking}");
    assert_eq!(booking["status"], "confirmed");
    assert_eq!(booking["paymentStatus"], "pending");
    assert_eq!(booking["totalAmountCents"], 5_000);

    let availability_uri = format!("/api/events/{event_id}/availability");
    let (status, availability) = send(&app, Method::GET, &availability_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(availability["spotsLeft"], 1);
    assert_eq!(availability["reserved"], 2);
    assert_eq!(availability["capacity"], 3);

    // Two more children do not fit in the single remaining spot.
    let mia = add_child(&app, OTHER_PARENT, "Mia").await;
    let noah = add_child(&app, OTHER_PARENT, "Noah").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/bookings",
        Some(OTHER_PARENT),
        Some(json!({ "eventId": event_id, "childIds": [mia, noah] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Not enough spots left");

    let booking_id = booking["id"].as_str().unwrap();
    let cancel_uri = format!("/api/bookings/{booking_id}/cancel");
    let (status, _) = send(&app, Method::POST, &cancel_uri, Some(OTHER_PARENT), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, cancelled) = send(&app, Method::POST, &cancel_uri, Some(PARENT), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    let (status, _) = send(&app, Method::POST, &cancel_uri, Some(PARENT), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, availability) = send(&app, Method::GET, &availability_uri, None, None).await;
    assert_eq!(availability["spotsLeft"], 3);

    let (status, listed) = send(&app, Method::GET, "/api/bookings", Some(PARENT), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn booking_someone_elses_child_is_forbidden() {
    let app = app();
    let event_id = publish(&app, "Story Time", 10).await;
    let theirs = add_child(&app, OTHER_PARENT, "Mia").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/bookings",
        Some(PARENT),
        Some(json!({ "eventId": event_id, "childIds": [theirs] })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/bookings",
        Some(PARENT),
        Some(json!({ "eventId": event_id, "childIds": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn publishing_requires_the_host_role() {
    let app = app();
    let body = serde_json::to_value(fixtures::new_event("Story Time", 10)).unwrap();
    let (status, _) = send(&app, Method::POST, "/api/events", Some(PARENT), Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut invalid = serde_json::to_value(fixtures::new_event("Story Time", 10)).unwrap();
    invalid["capacity"] = json!(0);
    let (status, _) = send(&app, Method::POST, "/api/events", Some(HOST), Some(invalid)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let event_id = publish(&app, "Story Time", 10).await;
    let uri = format!("/api/events/{event_id}");
    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(HOST),
        Some(json!({ "capacity": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");

    let (status, _) = send(&app, Method::DELETE, &uri, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn catalog_query_string_filters() {
    let app = app();
    publish(&app, "Story Time", 10).await;
    let mut soccer = fixtures::new_event("Soccer Skills Training", 20);
    soccer.category = only4kiddos_core::EventCategory::Sports;
    let body = serde_json::to_value(soccer).unwrap();
    let (status, _) = send(&app, Method::POST, "/api/events", Some(HOST), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, page) = send(&app, Method::GET, "/api/events?categories=sports", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["title"], "Soccer Skills Training");
    assert_eq!(page["items"][0]["spotsLeft"], 20);

    let (_, page) = send(&app, Method::GET, "/api/events?limit=1", None, None).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["hasMore"], true);

    let (status, _) = send(&app, Method::GET, "/api/events?categories=karaoke", None, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, Method::GET, "/api/events?limit=abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/events/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn favorites_toggle_and_personalize_views() {
    let app = app();
    let event_id = publish(&app, "Story Time", 10).await;
    let toggle = json!({ "eventId": event_id });

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/favorites/toggle",
        Some(PARENT),
        Some(toggle.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isFavorite"], true);
    assert_eq!(body["message"], "Event added to favorites");

    let uri = format!("/api/events/{event_id}");
    let (_, view) = send(&app, Method::GET, &uri, Some(PARENT), None).await;
    assert_eq!(view["isFavorite"], true);
    let (_, view) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(view["isFavorite"], false);

    let (_, favorites) = send(&app, Method::GET, "/api/favorites", Some(PARENT), None).await;
    assert_eq!(favorites.as_array().unwrap().len(), 1);

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/favorites/toggle",
        Some(PARENT),
        Some(toggle),
    )
    .await;
    assert_eq!(body["isFavorite"], false);
    let (_, favorites) = send(&app, Method::GET, "/api/favorites", Some(PARENT), None).await;
    assert!(favorites.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn children_belong_to_their_parent() {
    let app = app();
    let emma = add_child(&app, PARENT, "Emma").await;
    let uri = format!("/api/children/{emma}");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(OTHER_PARENT),
        Some(json!({ "age": 8 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, child) = send(&app, Method::PATCH, &uri, Some(PARENT), Some(json!({ "age": 8 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(child["age"], 8);

    let (_, listed) = send(&app, Method::GET, "/api/children", Some(OTHER_PARENT), None).await;
    assert!(listed.as_array().unwrap().is_empty());

    let (status, _) = send(&app, Method::DELETE, &uri, Some(PARENT), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(PARENT), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_routes_are_rate_limited_per_client() {
    let app = app_with(RateLimit {
        requests: 2,
        window: Duration::from_secs(60),
    });
    for _ in 0..2 {
        let (status, _) = send(&app, Method::GET, "/api/events", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = send(&app, Method::GET, "/api/events", None, None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "RATE_LIMITED");

    // Other clients keep their own budget.
    let request = Request::builder()
        .uri("/api/events")
        .header("X-Forwarded-For", "192.0.2.99")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Health checks are not counted.
    let (status, _) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
