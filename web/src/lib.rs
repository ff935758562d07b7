//! HTTP surface of the Only4kiddos booking backend.
//!
//! Thin axum layer over [`only4kiddos_booking::Services`]: handlers extract
//! the caller and the payload, call one service operation and map its
//! error through [`AppError`].
//!
//! ```text
//! request ─► correlation id ─► rate limit ─► extractors ─► service ─► JSON
//!                                              │
//!                                   Bearer token ─► IdentityVerifier
//! ```
//!
//! Errors are returned as `{"code": "...", "message": "..."}`.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use extractors::{CorrelationId, CurrentUser, MaybeUser};
pub use identity::{IdentityError, IdentityVerifier, StaticTokenVerifier};
pub use middleware::{CORRELATION_ID_HEADER, RateLimit, correlation_id_layer, rate_limited};
pub use routes::build_router;
pub use state::AppState;

