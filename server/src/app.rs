//! Startup wiring: ledger, services, verifier and the HTTP stack.

use crate::config::{Config, LedgerStore};
use anyhow::Context;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use only4kiddos_booking::{Services, seed};
use only4kiddos_core::environment::{Clock, SystemClock};
use only4kiddos_ledger::{AtomicInventoryStore, InventoryStore, MemoryInventoryStore, ReservationLedger};
use only4kiddos_web::{AppState, IdentityVerifier, StaticTokenVerifier, build_router};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Ledger over the configured store and policy.
#[must_use]
pub fn ledger(config: &Config) -> ReservationLedger {
    let store: Arc<dyn InventoryStore> = match config.ledger.store {
        LedgerStore::Memory => Arc::new(MemoryInventoryStore::new()),
        LedgerStore::Atomic => Arc::new(AtomicInventoryStore::new()),
    };
    ReservationLedger::new(store).with_policy(config.ledger.over_release)
}

/// Token verifier from `AUTH_DEV_TOKENS`. Without a table every token is
/// rejected.
///
/// # Errors
///
/// Returns an error for a malformed token table.
pub fn verifier(config: &Config) -> anyhow::Result<Arc<dyn IdentityVerifier>> {
    let verifier = match config.auth_dev_tokens.as_deref() {
        Some(table) => StaticTokenVerifier::parse(table).context("AUTH_DEV_TOKENS")?,
        None => {
            tracing::warn!("AUTH_DEV_TOKENS not set; authenticated routes will answer 401");
            StaticTokenVerifier::new()
        }
    };
    Ok(Arc::new(verifier))
}

/// CORS policy for the configured origins.
///
/// # Errors
///
/// Returns an error for an origin that is not a valid header value.
pub fn cors(config: &Config) -> anyhow::Result<CorsLayer> {
    let origins = config
        .server
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("invalid origin {origin:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

/// Build the services, seed them if configured and return the full router.
///
/// # Errors
///
/// Returns an error for invalid CORS origins or token table, or when
/// seeding fails.
pub async fn build(config: &Config) -> anyhow::Result<Router> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ledger = ledger(config);
    tracing::info!(
        store = ?config.ledger.store,
        policy = ?ledger.policy(),
        "Reservation ledger ready"
    );
    let services = Services::new(
        only4kiddos_booking::Repositories::in_memory(),
        ledger,
        Arc::clone(&clock),
    );

    if config.seed_sample_data {
        seed::seed_sample_data(&services.catalog, clock.as_ref())
            .await
            .context("seeding sample data")?;
    }

    let state = AppState::new(services, verifier(config)?);
    Ok(build_router(state, config.server.rate_limit)
        .layer(cors(config)?)
        .layer(TraceLayer::new_for_http()))
}
