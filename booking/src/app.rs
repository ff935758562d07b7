//! Service wiring.

use crate::catalog::EventCatalog;
use crate::children::ChildService;
use crate::favorites::FavoriteService;
use crate::memory::{
    InMemoryBookingRepository, InMemoryChildRepository, InMemoryEventRepository,
    InMemoryFavoriteRepository,
};
use crate::repository::{BookingRepository, ChildRepository, EventRepository, FavoriteRepository};
use crate::workflow::BookingWorkflow;
use only4kiddos_core::environment::{Clock, SystemClock};
use only4kiddos_ledger::ReservationLedger;
use std::sync::Arc;

/// Repositories backing the services.
#[derive(Clone)]
pub struct Repositories {
    /// Catalog events
    pub events: Arc<dyn EventRepository>,
    /// Child profiles
    pub children: Arc<dyn ChildRepository>,
    /// Bookings
    pub bookings: Arc<dyn BookingRepository>,
    /// Favorites
    pub favorites: Arc<dyn FavoriteRepository>,
}

impl Repositories {
    /// Fresh in-memory repositories.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            events: Arc::new(InMemoryEventRepository::new()),
            children: Arc::new(InMemoryChildRepository::new()),
            bookings: Arc::new(InMemoryBookingRepository::new()),
            favorites: Arc::new(InMemoryFavoriteRepository::new()),
        }
    }
}

/// Every service of the backend, sharing one ledger and one set of
/// repositories.
#[derive(Clone)]
pub struct Services {
    /// Event catalog
    pub catalog: EventCatalog,
    /// Child profiles
    pub children: ChildService,
    /// Favorites
    pub favorites: FavoriteService,
    /// Booking workflow
    pub bookings: BookingWorkflow,
    /// Reservation ledger
    pub ledger: ReservationLedger,
}

impl Services {
    /// Wire the services together.
    #[must_use]
    pub fn new(repositories: Repositories, ledger: ReservationLedger, clock: Arc<dyn Clock>) -> Self {
        let catalog = EventCatalog::new(
            Arc::clone(&repositories.events),
            Arc::clone(&repositories.favorites),
            ledger.clone(),
            Arc::clone(&clock),
        );
        let children = ChildService::new(Arc::clone(&repositories.children), Arc::clone(&clock));
        let favorites = FavoriteService::new(Arc::clone(&repositories.favorites), catalog.clone());
        let bookings = BookingWorkflow::new(
            repositories.events,
            repositories.children,
            repositories.bookings,
            ledger.clone(),
            clock,
        );
        Self {
            catalog,
            children,
            favorites,
            bookings,
            ledger,
        }
    }

    /// In-memory repositories, the given ledger and the system clock.
    #[must_use]
    pub fn in_memory(ledger: ReservationLedger) -> Self {
        Self::new(Repositories::in_memory(), ledger, Arc::new(SystemClock))
    }
}
