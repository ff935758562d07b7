//! # Only4kiddos Booking
//!
//! Services behind the family-event booking API:
//!
//! - [`EventCatalog`]: browse, publish, edit and delete events
//! - [`ChildService`]: a parent's child profiles
//! - [`FavoriteService`]: per-user favorite events
//! - [`BookingWorkflow`]: reserve spots, persist bookings, compensate on
//!   failure and release exactly once on cancellation
//!
//! Storage is injected through the traits in [`repository`]; capacity lives
//! in the [`ReservationLedger`](only4kiddos_ledger::ReservationLedger).
//! Role and ownership checks happen here, at the service boundary, never in
//! the ledger.

pub mod app;
pub mod authz;
pub mod catalog;
pub mod children;
pub mod error;
pub mod favorites;
pub mod memory;
pub mod metrics;
pub mod repository;
pub mod seed;
pub mod workflow;

pub use app::{Repositories, Services};
pub use catalog::EventCatalog;
pub use children::ChildService;
pub use error::{BookingError, Result};
pub use favorites::{FavoriteService, FavoriteToggle};
pub use memory::{
    InMemoryBookingRepository, InMemoryChildRepository, InMemoryEventRepository,
    InMemoryFavoriteRepository,
};
pub use repository::{BookingRepository, ChildRepository, EventRepository, FavoriteRepository};
pub use workflow::BookingWorkflow;
