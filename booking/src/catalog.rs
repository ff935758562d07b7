//! Event catalog.
//!
//! Events hold catalog metadata only. Availability always comes from the
//! reservation ledger, which is joined in when an [`EventView`] is built.

use crate::authz;
use crate::error::{BookingError, Result};
use crate::repository::{EventRepository, FavoriteRepository};
use async_trait::async_trait;
use only4kiddos_core::environment::Clock;
use only4kiddos_core::{
    AuthContext, Event, EventFilter, EventId, EventPatch, EventView, NewEvent, Page,
};
use only4kiddos_ledger::{CapacitySource, EventInventory, LedgerError, ReservationLedger};
use std::collections::HashSet;
use std::sync::Arc;

/// Catalog service: browsing, publishing and maintaining events.
#[derive(Clone)]
pub struct EventCatalog {
    events: Arc<dyn EventRepository>,
    favorites: Arc<dyn FavoriteRepository>,
    ledger: ReservationLedger,
    clock: Arc<dyn Clock>,
}

impl EventCatalog {
    /// Create a catalog over the given repositories and ledger.
    #[must_use]
    pub fn new(
        events: Arc<dyn EventRepository>,
        favorites: Arc<dyn FavoriteRepository>,
        ledger: ReservationLedger,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            events,
            favorites,
            ledger,
            clock,
        }
    }

    /// Events matching `filter`, soonest first, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed filter, or a repository
    /// or ledger failure.
    #[tracing::instrument(skip_all, fields(limit = filter.limit, offset = filter.offset))]
    pub async fn list(
        &self,
        filter: &EventFilter,
        viewer: Option<&AuthContext>,
    ) -> Result<Page<EventView>> {
        filter.validate()?;
        let mut matching: Vec<Event> = self
            .events
            .all()
            .await?
            .into_iter()
            .filter(|event| filter.matches(event))
            .collect();
        matching.sort_by(|a, b| {
            a.details
                .date
                .cmp(&b.details.date)
                .then_with(|| a.details.title.cmp(&b.details.title))
        });

        let favorites = self.favorite_set(viewer).await?;
        let mut views = Vec::with_capacity(matching.len());
        for event in matching {
            if let Some(view) = self.view(event, &favorites).await? {
                views.push(view);
            }
        }

        let page = Page::paginate(views, filter.limit, filter.offset);
        tracing::debug!(total = page.total, returned = page.items.len(), "Events listed");
        Ok(page)
    }

    /// One event with its live availability.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::EventNotFound`] for an unknown event.
    pub async fn get(&self, id: EventId, viewer: Option<&AuthContext>) -> Result<EventView> {
        let event = self.load(id).await?;
        let favorites = self.favorite_set(viewer).await?;
        self.view(event, &favorites)
            .await?
            .ok_or(BookingError::EventNotFound(id))
    }

    /// Stored event record.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::EventNotFound`] for an unknown event.
    pub async fn load(&self, id: EventId) -> Result<Event> {
        self.events
            .get(&id)
            .await?
            .ok_or(BookingError::EventNotFound(id))
    }

    /// Publish a new event and open its inventory at full capacity.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Forbidden`] unless the caller is a host or admin
    /// - a validation error for malformed details
    #[tracing::instrument(skip_all, fields(user_id = %auth.user_id))]
    pub async fn create(&self, auth: &AuthContext, details: NewEvent) -> Result<EventView> {
        authz::require_host(auth, "create events")?;
        details.validate()?;

        let event = Event::new(details, auth.user_id.clone(), self.clock.now());
        let event_id = event.id;
        self.events.save(event.clone()).await?;
        if let Err(err) = self.ledger.open_from(self, event_id).await {
            // Without an inventory the event could never be booked.
            if let Err(cleanup) = self.events.delete(&event_id).await {
                tracing::error!(%event_id, error = %cleanup, "Failed to remove event after inventory error");
            }
            return Err(err.into());
        }

        tracing::info!(%event_id, capacity = event.capacity(), "Event created");
        let spots_left = event.capacity();
        Ok(EventView {
            event,
            spots_left,
            is_favorite: false,
        })
    }

    /// Apply a partial update. Capacity cannot change.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Forbidden`] unless the caller is a host who created
    ///   the event, or an admin
    /// - [`BookingError::EventNotFound`] for an unknown event
    /// - a validation error for a malformed patch
    #[tracing::instrument(skip_all, fields(%id, user_id = %auth.user_id))]
    pub async fn update(&self, auth: &AuthContext, id: EventId, patch: EventPatch) -> Result<EventView> {
        authz::require_host(auth, "update events")?;
        let mut event = self.load(id).await?;
        authz::require_owner_or_admin(auth, &event.created_by, "update this event")?;

        patch.apply(&mut event, self.clock.now())?;
        self.events.save(event.clone()).await?;
        tracing::info!("Event updated");

        let favorites = self.favorite_set(Some(auth)).await?;
        self.view(event, &favorites)
            .await?
            .ok_or(BookingError::EventNotFound(id))
    }

    /// Remove an event, close its inventory and drop it from favorites.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Forbidden`] unless the caller is a host who created
    ///   the event, or an admin
    /// - [`BookingError::EventNotFound`] for an unknown event
    #[tracing::instrument(skip_all, fields(%id, user_id = %auth.user_id))]
    pub async fn delete(&self, auth: &AuthContext, id: EventId) -> Result<()> {
        authz::require_host(auth, "delete events")?;
        let event = self.load(id).await?;
        authz::require_owner_or_admin(auth, &event.created_by, "delete this event")?;

        self.events.delete(&id).await?;
        if let Some(inventory) = self.ledger.close(id).await? {
            if inventory.reserved() > 0 {
                tracing::warn!(reserved = inventory.reserved(), "Deleted event still had reservations");
            }
        }
        self.favorites.forget_event(&id).await?;
        tracing::info!("Event deleted");
        Ok(())
    }

    /// Current inventory of an event.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::EventNotFound`] when the event has no inventory.
    pub async fn availability(&self, id: EventId) -> Result<EventInventory> {
        self.ledger.inventory(id).await.map_err(|err| match err {
            LedgerError::NotFound { event_id } => {
                BookingError::EventNotFound(event_id)
            }
            other => other.into(),
        })
    }

    pub(crate) async fn favorite_set(&self, viewer: Option<&AuthContext>) -> Result<HashSet<EventId>> {
        match viewer {
            Some(auth) => Ok(self.favorites.for_user(&auth.user_id).await?.into_iter().collect()),
            None => Ok(HashSet::new()),
        }
    }

    /// Join the live spot count into `event`.
    ///
    /// `None` while the event has no inventory: it is being published or
    /// removed by a concurrent request.
    pub(crate) async fn view(&self, event: Event, favorites: &HashSet<EventId>) -> Result<Option<EventView>> {
        let spots_left = match self.ledger.peek(event.id).await {
            Ok(spots_left) => spots_left,
            Err(LedgerError::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let is_favorite = favorites.contains(&event.id);
        Ok(Some(EventView {
            event,
            spots_left,
            is_favorite,
        }))
    }
}

#[async_trait]
impl CapacitySource for EventCatalog {
    async fn get_capacity(&self, event_id: &EventId) -> std::result::Result<Option<u32>, String> {
        self.events
            .get(event_id)
            .await
            .map(|event| event.map(|event| event.capacity()))
            .map_err(|err| err.to_string())
    }
}
