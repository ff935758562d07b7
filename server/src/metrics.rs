//! Prometheus exporter.
//!
//! Installs the global `metrics` recorder and serves its rendering on
//! `GET /metrics` from a listener separate from the API.

use axum::{Router, extract::State, routing::get};
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
    /// Failed to bind HTTP server
    #[error("Failed to bind metrics server: {0}")]
    Bind(#[from] std::io::Error),
}

/// Register descriptions for every metric the server records.
pub fn describe_all() {
    only4kiddos_ledger::metrics::describe();
    only4kiddos_booking::metrics::describe();
    describe_counter!(
        "http_rate_limited_total",
        "Requests rejected by the per-client rate limit"
    );
}

/// Install the Prometheus recorder.
///
/// # Errors
///
/// Returns [`MetricsError::Install`] if a recorder is already installed.
pub fn install() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::Install(e.to_string()))?;
    describe_all();
    Ok(handle)
}

/// Router serving the rendered metrics.
pub fn router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(render))
        .with_state(handle)
}

#[allow(clippy::unused_async)]
async fn render(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

/// Bind `addr` and serve metrics in the background.
///
/// # Errors
///
/// Returns [`MetricsError::Bind`] if the address is unavailable.
pub async fn serve(addr: SocketAddr, handle: PrometheusHandle) -> Result<(), MetricsError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Metrics available at http://{addr}/metrics");
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router(handle)).await {
            tracing::error!(error = %err, "Metrics server stopped");
        }
    });
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn renders_recorded_metrics() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("booking_created_total").increment(2);
        });

        let response = router(handle)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("booking_created_total 2"));
    }
}
