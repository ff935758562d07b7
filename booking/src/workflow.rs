//! Booking workflow.
//!
//! Creating a booking spans two components: the ledger holds the spots and
//! the booking repository holds the record. There is no transaction across
//! them. The workflow reserves first and, if anything after the reservation
//! fails, releases the same quantity again before returning the error.
//!
//! Cancelling flips the booking to `cancelled` in one atomic repository
//! step. Only the caller that performed the flip releases the spots, so a
//! booking gives its spots back exactly once however often it is cancelled.

use crate::authz;
use crate::error::{BookingError, Result};
use crate::metrics::BookingMetrics;
use crate::repository::{BookingRepository, ChildRepository, EventRepository};
use only4kiddos_core::environment::Clock;
use only4kiddos_core::{AuthContext, Booking, BookingId, ChildId, Event, EventId, ValidationError};
use only4kiddos_ledger::{LedgerError, Quantity, ReservationLedger};
use std::collections::HashSet;
use std::sync::Arc;

/// Orchestrates reserve, price, persist and compensate.
#[derive(Clone)]
pub struct BookingWorkflow {
    events: Arc<dyn EventRepository>,
    children: Arc<dyn ChildRepository>,
    bookings: Arc<dyn BookingRepository>,
    ledger: ReservationLedger,
    clock: Arc<dyn Clock>,
}

impl BookingWorkflow {
    /// Create the workflow.
    #[must_use]
    pub fn new(
        events: Arc<dyn EventRepository>,
        children: Arc<dyn ChildRepository>,
        bookings: Arc<dyn BookingRepository>,
        ledger: ReservationLedger,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            events,
            children,
            bookings,
            ledger,
            clock,
        }
    }

    /// Book `child_ids` onto an event, one spot per child.
    ///
    /// # Errors
    ///
    /// - a validation error for an empty or duplicated child list
    /// - [`BookingError::EventNotFound`] for an unknown event
    /// - [`BookingError::ChildNotOwned`] if a child is not the caller's
    /// - [`LedgerError::InsufficientCapacity`] when too few spots are left
    /// - any failure after the reservation, once the spots are released
    #[tracing::instrument(skip_all, fields(%event_id, user_id = %auth.user_id, party = child_ids.len()))]
    pub async fn create(
        &self,
        auth: &AuthContext,
        event_id: EventId,
        child_ids: Vec<ChildId>,
    ) -> Result<Booking> {
        let quantity = party_size(&child_ids)?;
        let event = self
            .events
            .get(&event_id)
            .await?
            .ok_or(BookingError::EventNotFound(event_id))?;
        self.check_children(auth, &child_ids).await?;

        self.ledger.reserve(event_id, quantity).await?;
        match self.complete(auth, &event, child_ids, quantity).await {
            Ok(booking) => {
                BookingMetrics::record_created();
                tracing::info!(booking_id = %booking.id, total = %booking.total_amount_cents, "Booking confirmed");
                Ok(booking)
            }
            Err(err) => {
                self.compensate(event_id, quantity, &err).await;
                Err(err)
            }
        }
    }

    /// Cancel a booking and give its spots back.
    ///
    /// # Errors
    ///
    /// - [`BookingError::BookingNotFound`] for an unknown booking
    /// - [`BookingError::Forbidden`] unless the caller made the booking or
    ///   is an admin
    /// - [`BookingError::AlreadyCancelled`] for every cancel after the first
    #[tracing::instrument(skip_all, fields(%booking_id, user_id = %auth.user_id))]
    pub async fn cancel(&self, auth: &AuthContext, booking_id: BookingId) -> Result<Booking> {
        let booking = self.load(booking_id).await?;
        authz::require_owner_or_admin(auth, &booking.user_id, "cancel this booking")?;
        if !booking.is_active() {
            return Err(BookingError::AlreadyCancelled);
        }

        let Some(cancelled) = self
            .bookings
            .cancel_if_active(&booking_id, self.clock.now())
            .await?
        else {
            return Err(BookingError::AlreadyCancelled);
        };
        BookingMetrics::record_cancelled();

        let Ok(quantity) = Quantity::new(cancelled.party_size()) else {
            tracing::error!("Cancelled booking held no spots");
            return Ok(cancelled);
        };
        match self.ledger.release(cancelled.event_id, quantity).await {
            Ok(spots_left) => {
                tracing::info!(event_id = %cancelled.event_id, spots_left, "Booking cancelled");
                Ok(cancelled)
            }
            Err(LedgerError::NotFound { event_id }) => {
                tracing::warn!(%event_id, "Booking cancelled after its event was deleted");
                Ok(cancelled)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// The caller's bookings, most recent first.
    ///
    /// # Errors
    ///
    /// Returns a repository failure.
    pub async fn list(&self, auth: &AuthContext) -> Result<Vec<Booking>> {
        let mut bookings = self.bookings.for_user(&auth.user_id).await?;
        bookings.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
        Ok(bookings)
    }

    /// One booking, visible to its owner and to admins.
    ///
    /// # Errors
    ///
    /// - [`BookingError::BookingNotFound`] for an unknown booking
    /// - [`BookingError::Forbidden`] for anyone else
    pub async fn get(&self, auth: &AuthContext, booking_id: BookingId) -> Result<Booking> {
        let booking = self.load(booking_id).await?;
        authz::require_owner_or_admin(auth, &booking.user_id, "view this booking")?;
        Ok(booking)
    }

    async fn load(&self, booking_id: BookingId) -> Result<Booking> {
        self.bookings
            .get(&booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))
    }

    async fn check_children(&self, auth: &AuthContext, child_ids: &[ChildId]) -> Result<()> {
        for id in child_ids {
            match self.children.get(id).await? {
                Some(child) if child.parent_id == auth.user_id => {}
                _ => return Err(BookingError::ChildNotOwned),
            }
        }
        Ok(())
    }

    /// Everything that happens after the spots are held.
    async fn complete(
        &self,
        auth: &AuthContext,
        event: &Event,
        child_ids: Vec<ChildId>,
        quantity: Quantity,
    ) -> Result<Booking> {
        let total = event
            .details
            .price_cents
            .checked_mul(quantity.get())
            .ok_or(BookingError::PriceOverflow)?;
        let booking = Booking::confirmed(
            event.id,
            child_ids,
            auth.user_id.clone(),
            total,
            self.clock.now(),
        );
        self.bookings.insert(booking.clone()).await?;
        Ok(booking)
    }

    async fn compensate(&self, event_id: EventId, quantity: Quantity, cause: &BookingError) {
        BookingMetrics::record_compensated();
        match self.ledger.release(event_id, quantity).await {
            Ok(spots_left) => {
                tracing::warn!(error = %cause, spots_left, "Booking failed after reservation; spots released");
            }
            Err(err) => {
                tracing::error!(error = %cause, release_error = %err, "Booking failed and its reservation could not be released");
            }
        }
    }
}

fn party_size(child_ids: &[ChildId]) -> Result<Quantity> {
    if child_ids.is_empty() {
        return Err(ValidationError::NoChildren.into());
    }
    let mut seen = HashSet::with_capacity(child_ids.len());
    if !child_ids.iter().all(|id| seen.insert(*id)) {
        return Err(ValidationError::DuplicateChild.into());
    }
    let count = u32::try_from(child_ids.len()).map_err(|_| ValidationError::TooMany {
        field: "childIds",
        max: u32::MAX as usize,
    })?;
    Ok(Quantity::new(count)?)
}
