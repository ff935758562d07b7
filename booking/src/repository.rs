//! Repository traits.
//!
//! Services receive their storage as `Arc<dyn ...>` so the in-memory
//! implementations in [`crate::memory`] can be swapped for a database
//! without touching service code. Every method that has to check and write
//! in one step says so; implementations must make that step atomic.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use only4kiddos_core::{Booking, BookingId, Child, ChildId, Event, EventId, UserId};

/// Catalog event storage.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Every stored event, in no particular order.
    async fn all(&self) -> Result<Vec<Event>>;

    /// One event.
    async fn get(&self, id: &EventId) -> Result<Option<Event>>;

    /// Insert or replace an event.
    async fn save(&self, event: Event) -> Result<()>;

    /// Delete an event, returning whether it existed.
    async fn delete(&self, id: &EventId) -> Result<bool>;
}

/// Child profile storage.
#[async_trait]
pub trait ChildRepository: Send + Sync {
    /// Children of one parent, in no particular order.
    async fn for_parent(&self, parent_id: &UserId) -> Result<Vec<Child>>;

    /// One child.
    async fn get(&self, id: &ChildId) -> Result<Option<Child>>;

    /// Insert or replace a child.
    async fn save(&self, child: Child) -> Result<()>;

    /// Delete a child, returning whether it existed.
    async fn delete(&self, id: &ChildId) -> Result<bool>;
}

/// Booking storage.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Bookings made by one user, in no particular order.
    async fn for_user(&self, user_id: &UserId) -> Result<Vec<Booking>>;

    /// One booking.
    async fn get(&self, id: &BookingId) -> Result<Option<Booking>>;

    /// Insert a new booking.
    async fn insert(&self, booking: Booking) -> Result<()>;

    /// Mark an active booking as cancelled in one atomic step.
    ///
    /// Returns the cancelled booking if this call performed the transition,
    /// or `None` if the booking was already cancelled. Of any number of
    /// concurrent callers exactly one observes `Some`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::BookingNotFound`](crate::BookingError::BookingNotFound)
    /// for an unknown booking.
    async fn cancel_if_active(&self, id: &BookingId, now: DateTime<Utc>) -> Result<Option<Booking>>;
}

/// Per-user favorite events, kept in insertion order.
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Add the event if absent, remove it if present, as one atomic step.
    ///
    /// Returns whether the event is a favorite afterwards.
    async fn toggle(&self, user_id: &UserId, event_id: &EventId) -> Result<bool>;

    /// The user's favorites, oldest first.
    async fn for_user(&self, user_id: &UserId) -> Result<Vec<EventId>>;

    /// Drop an event from every user's favorites.
    async fn forget_event(&self, event_id: &EventId) -> Result<()>;
}
