//! # Only4kiddos Core
//!
//! Domain types shared by every crate of the Only4kiddos booking backend.
//!
//! This crate provides:
//! - Identifiers (`EventId`, `ChildId`, `BookingId`, `UserId`)
//! - Catalog, account and booking records with their input validation
//! - `Money` (integer cents) for prices and booking totals
//! - The caller identity (`AuthContext`) and its roles
//! - Query filters and pagination for the event catalog
//! - The injected `Clock` environment trait
//!
//! ## Ownership
//!
//! Nothing in here mutates shared state. Capacity counters live in the
//! reservation ledger; records live in repositories owned by the booking
//! services. This crate only describes the data and checks that inputs are
//! well formed.

pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};

pub mod auth;
pub mod booking;
pub mod child;
pub mod event;
pub mod filter;
pub mod ids;
pub mod money;
pub mod validation;

pub use auth::{AuthContext, Role};
pub use booking::{Booking, BookingStatus, PaymentStatus};
pub use child::{Child, ChildPatch, NewChild};
pub use event::{AgeRange, Event, EventCategory, EventPatch, EventView, NewEvent};
pub use filter::{DateRange, EventFilter, Page, PriceRange};
pub use ids::{BookingId, ChildId, EventId, UserId};
pub use money::Money;
pub use validation::ValidationError;

/// Environment module - injected dependencies
///
/// Services never read the system time directly; they receive a [`Clock`]
/// so tests can pin timestamps.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use only4kiddos_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let before = clock.now();
    /// assert!(clock.now() >= before);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
