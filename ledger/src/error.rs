//! Error types for ledger operations.

use only4kiddos_core::EventId;
use thiserror::Error;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Every way a reserve, release or lookup can fail.
///
/// No variant is ever returned after a partial mutation: when a call fails,
/// the inventory is exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// No inventory exists for the event.
    #[error("No inventory for event {event_id}")]
    NotFound {
        /// Event that was referenced
        event_id: EventId,
    },

    /// Fewer spots are left than were requested.
    #[error("Not enough spots left for event {event_id}: requested {requested}, available {available}")]
    InsufficientCapacity {
        /// Event that was referenced
        event_id: EventId,
        /// Spots requested
        requested: u32,
        /// Spots left when the request was evaluated
        available: u32,
    },

    /// A release would push spots left above capacity.
    ///
    /// This is a caller bug: more spots were released than were reserved.
    #[error(
        "Release of {requested} spots on event {event_id} exceeds capacity {capacity} ({available} spots left)"
    )]
    OverRelease {
        /// Event that was referenced
        event_id: EventId,
        /// Spots the caller tried to release
        requested: u32,
        /// Spots left when the release was evaluated
        available: u32,
        /// Fixed capacity of the event
        capacity: u32,
    },

    /// An inventory for the event is already open.
    #[error("Inventory for event {event_id} already exists")]
    AlreadyExists {
        /// Event that was referenced
        event_id: EventId,
    },

    /// A reserve or release was requested for zero spots.
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    /// An inventory was opened with zero capacity.
    #[error("Capacity must be at least 1")]
    InvalidCapacity,

    /// The backing store failed.
    #[error("Inventory store error: {0}")]
    Store(String),
}

impl LedgerError {
    /// Whether the error points at a bug rather than a business outcome.
    ///
    /// Defects are logged at error level and never shown verbatim to end users.
    #[must_use]
    pub const fn is_defect(&self) -> bool {
        matches!(self, Self::OverRelease { .. } | Self::Store(_))
    }
}
