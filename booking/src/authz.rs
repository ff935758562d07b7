//! Capability checks at the service boundary.

use crate::error::{BookingError, Result};
use only4kiddos_core::{AuthContext, UserId};

/// Require the host or admin role.
///
/// # Errors
///
/// Returns [`BookingError::Forbidden`] for plain users.
pub fn require_host(auth: &AuthContext, action: &'static str) -> Result<()> {
    if auth.can_host() {
        Ok(())
    } else {
        Err(BookingError::forbidden(action))
    }
}

/// Require that the caller owns the record or is an admin.
///
/// # Errors
///
/// Returns [`BookingError::Forbidden`] otherwise.
pub fn require_owner_or_admin(auth: &AuthContext, owner: &UserId, action: &'static str) -> Result<()> {
    if auth.owns_or_admin(owner) {
        Ok(())
    } else {
        Err(BookingError::forbidden(action))
    }
}

/// Require that the caller owns the record. Admins get no exception.
///
/// # Errors
///
/// Returns [`BookingError::Forbidden`] otherwise.
pub fn require_owner(auth: &AuthContext, owner: &UserId, action: &'static str) -> Result<()> {
    if &auth.user_id == owner {
        Ok(())
    } else {
        Err(BookingError::forbidden(action))
    }
}
