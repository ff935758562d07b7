//! Error types for the booking services.

use only4kiddos_core::{BookingId, ChildId, EventId, ValidationError};
use only4kiddos_ledger::LedgerError;
use thiserror::Error;

/// Result type alias for booking services.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Errors returned by the catalog, account and booking services.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Malformed input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The reservation ledger refused or failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// No such event in the catalog.
    #[error("Event {0} not found")]
    EventNotFound(EventId),

    /// No such child profile.
    #[error("Child {0} not found")]
    ChildNotFound(ChildId),

    /// No such booking.
    #[error("Booking {0} not found")]
    BookingNotFound(BookingId),

    /// One or more children of a booking request belong to someone else.
    #[error("One or more children do not belong to you")]
    ChildNotOwned,

    /// The caller lacks the role or ownership the action needs.
    #[error("Not authorized to {action}")]
    Forbidden {
        /// What the caller tried to do
        action: &'static str,
    },

    /// The booking was cancelled before.
    #[error("Booking is already cancelled")]
    AlreadyCancelled,

    /// The booking total does not fit in the money type.
    #[error("Booking total overflows")]
    PriceOverflow,

    /// A repository failed.
    #[error("Repository error: {0}")]
    Repository(String),
}

impl BookingError {
    /// Shorthand for [`BookingError::Forbidden`].
    #[must_use]
    pub const fn forbidden(action: &'static str) -> Self {
        Self::Forbidden { action }
    }

    /// Whether the error points at a bug or an infrastructure failure.
    #[must_use]
    pub const fn is_defect(&self) -> bool {
        match self {
            Self::Ledger(err) => err.is_defect(),
            Self::Repository(_) | Self::PriceOverflow => true,
            _ => false,
        }
    }
}
