//! Application state for Axum handlers.

use crate::identity::IdentityVerifier;
use only4kiddos_booking::Services;
use std::sync::Arc;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Booking services
    pub services: Services,
    /// Bearer token verifier
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    /// Create the state.
    #[must_use]
    pub fn new(services: Services, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { services, verifier }
    }
}
