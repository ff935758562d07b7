//! Tower middleware for request tracking and rate limiting.
//!
//! - [`correlation_id_layer`]: reads or generates `X-Correlation-ID`, opens
//!   an `http_request` span and echoes the id on the response
//! - [`rate_limited`]: per-client request budget backed by `tower_governor`
//!
//! # Example
//!
//! ```
//! use axum::{Router, routing::get};
//! use only4kiddos_web::middleware::{RateLimit, correlation_id_layer, rate_limited};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let api: Router = Router::new().route("/events", get(|| async { "[]" }));
//! let app: Router = rate_limited(api, RateLimit::default()).layer(correlation_id_layer());
//! # }
//! ```

use crate::error::AppError;
use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tower::{Layer, Service};
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tracing::Instrument;
use uuid::Uuid;

type BoxFuture<T, E> = std::pin::Pin<Box<dyn std::future::Future<Output = Result<T, E>> + Send>>;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Create a layer that adds correlation ID tracking to all requests.
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// Layer for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Middleware service for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let correlation_id = req
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        req.extensions_mut().insert(correlation_id);

        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %req.method(),
            uri = %req.uri(),
        );

        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.instrument(span).await?;

            if let Ok(header_value) = HeaderValue::from_str(&correlation_id.to_string()) {
                response
                    .headers_mut()
                    .insert(CORRELATION_ID_HEADER, header_value);
            }

            Ok(response)
        })
    }
}

/// Per-client request budget.
///
/// A client may spend `requests` at once; spent requests come back one at a
/// time, spread evenly over `window`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests allowed per window and client
    pub requests: u32,
    /// Window length
    pub window: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests: 60,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimit {
    /// Time for one spent request to come back.
    #[must_use]
    pub fn replenish_period(&self) -> Duration {
        (self.window / self.requests.max(1)).max(Duration::from_millis(1))
    }
}

/// Apply `limit` to every route of `router`, keyed by client IP.
///
/// The client is the first `X-Forwarded-For` address, then `X-Real-IP`,
/// `Forwarded`, and finally the connection address. Rejected requests get
/// a JSON 429.
///
/// Idle client state is pruned once per window by a background task that
/// ends when the router is dropped. Outside a tokio runtime no pruning
/// task is started.
pub fn rate_limited<S>(router: Router<S>, limit: RateLimit) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let Some(config) = GovernorConfigBuilder::default()
        .period(limit.replenish_period())
        .burst_size(limit.requests.max(1))
        .key_extractor(SmartIpKeyExtractor)
        .use_headers()
        .finish()
    else {
        tracing::error!(?limit, "Rate limit quota rejected; requests are not limited");
        return router;
    };
    let config = Arc::new(config);

    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            let limiter = Arc::downgrade(config.limiter());
            let every = limit.window.max(Duration::from_secs(1));
            runtime.spawn(async move {
                let mut ticks = tokio::time::interval(every);
                ticks.tick().await;
                loop {
                    ticks.tick().await;
                    let Some(live) = limiter.upgrade() else {
                        break;
                    };
                    live.retain_recent();
                    tracing::debug!(clients = live.len(), "Pruned rate limiter state");
                }
            });
        }
        Err(_) => tracing::debug!("No tokio runtime; rate limiter state is not pruned"),
    }

    router
        .layer(GovernorLayer { config })
        .layer(axum::middleware::map_response(rate_limit_response))
}

/// Replace the limiter's plain-text 429 with the API error body. Retry
/// hints set by the limiter are kept.
async fn rate_limit_response(response: Response) -> Response {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }
    tracing::warn!("Rate limit exceeded");
    metrics::counter!("http_rate_limited_total").increment(1);

    let (mut parts, _) = response.into_parts();
    let (limited, body) = AppError::too_many_requests("Too many requests, please try again later.")
        .into_response()
        .into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.extend(limited.headers);
    Response::from_parts(parts, body)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_correlation_id_generated_if_missing() {
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(correlation_id_layer());

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        let correlation_id = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .expect("Correlation ID header should be present");
        assert!(Uuid::parse_str(correlation_id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_correlation_id_preserved_from_request() {
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(correlation_id_layer());

        let request_uuid = Uuid::new_v4();
        let request = Request::builder()
            .uri("/test")
            .header(CORRELATION_ID_HEADER, request_uuid.to_string())
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let response_id = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(response_id, request_uuid.to_string());
    }

    fn limited_app(limit: RateLimit) -> Router {
        rate_limited(Router::new().route("/test", get(|| async { "ok" })), limit)
    }

    fn from(ip: &str) -> Request {
        Request::builder()
            .uri("/test")
            .header("X-Forwarded-For", ip)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn budget_refills_evenly_over_the_window() {
        assert_eq!(RateLimit::default().replenish_period(), Duration::from_secs(1));
        let burst = RateLimit {
            requests: 4,
            window: Duration::from_secs(60),
        };
        assert_eq!(burst.replenish_period(), Duration::from_secs(15));
        let degenerate = RateLimit {
            requests: 0,
            window: Duration::ZERO,
        };
        assert_eq!(degenerate.replenish_period(), Duration::from_millis(1));
    }

    #[tokio::test]
    async fn over_limit_requests_get_a_json_429() {
        let app = limited_app(RateLimit {
            requests: 2,
            window: Duration::from_secs(60),
        });

        for _ in 0..2 {
            let response = app.clone().oneshot(from("198.51.100.1")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = app.clone().oneshot(from("198.51.100.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["code"], "RATE_LIMITED");

        let response = app.oneshot(from("198.51.100.2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn spent_requests_come_back_after_the_replenish_period() {
        let app = limited_app(RateLimit {
            requests: 1,
            window: Duration::from_millis(50),
        });

        let response = app.clone().oneshot(from("203.0.113.5")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let response = app.clone().oneshot(from("203.0.113.5")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        tokio::time::sleep(Duration::from_millis(80)).await;
        let response = app.oneshot(from("203.0.113.5")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn many_distinct_clients_are_each_admitted() {
        let app = limited_app(RateLimit {
            requests: 1,
            window: Duration::from_secs(60),
        });

        for i in 0..20_000_u32 {
            let [_, a, b, c] = i.to_be_bytes();
            let ip = format!("10.{a}.{b}.{c}");
            let response = app.clone().oneshot(from(&ip)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{ip}");
        }
    }
}
