//! The reservation ledger.

use crate::error::{LedgerError, Result};
use crate::inventory::{Capacity, EventInventory, OverReleasePolicy, Quantity};
use crate::memory::MemoryInventoryStore;
use crate::metrics::LedgerMetrics;
use crate::store::{CapacitySource, InventoryStore};
use only4kiddos_core::EventId;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Sole owner of every event's `spots_left` counter.
///
/// Reserve and release are atomic per event: the capacity check and the
/// mutation happen as one step inside the injected [`InventoryStore`], so
/// concurrent callers can never oversell an event or push its counter above
/// capacity.
///
/// Cloning is cheap; clones share the same store.
#[derive(Clone)]
pub struct ReservationLedger {
    store: Arc<dyn InventoryStore>,
    policy: OverReleasePolicy,
}

impl fmt::Debug for ReservationLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReservationLedger")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ReservationLedger {
    /// Create a ledger over `store` with the default over-release policy.
    #[must_use]
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            store,
            policy: OverReleasePolicy::default(),
        }
    }

    /// Ledger over a fresh [`MemoryInventoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryInventoryStore::new()))
    }

    /// Replace the over-release policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: OverReleasePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Active over-release policy.
    #[must_use]
    pub const fn policy(&self) -> OverReleasePolicy {
        self.policy
    }

    /// Open an inventory with every spot available.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidCapacity`] for a capacity of zero
    /// - [`LedgerError::AlreadyExists`] if the event already has an inventory
    #[tracing::instrument(skip_all, fields(%event_id, capacity = capacity))]
    pub async fn open(&self, event_id: EventId, capacity: u32) -> Result<EventInventory> {
        let inventory = EventInventory::open(event_id, Capacity::new(capacity)?);
        self.store.put(inventory).await?;
        LedgerMetrics::record_spots_left(event_id, inventory.spots_left());
        tracing::info!("Inventory opened");
        Ok(inventory)
    }

    /// Open an inventory using the capacity reported by `source`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] if the source does not know the event
    /// - [`LedgerError::Store`] if the source lookup fails
    /// - any error of [`ReservationLedger::open`]
    pub async fn open_from(
        &self,
        source: &dyn CapacitySource,
        event_id: EventId,
    ) -> Result<EventInventory> {
        let capacity = source
            .get_capacity(&event_id)
            .await
            .map_err(LedgerError::Store)?
            .ok_or(LedgerError::NotFound { event_id })?;
        self.open(event_id, capacity).await
    }

    /// Drop an event's inventory, returning its last state.
    ///
    /// Closing an unknown event is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] if the backend fails.
    #[tracing::instrument(skip_all, fields(%event_id))]
    pub async fn close(&self, event_id: EventId) -> Result<Option<EventInventory>> {
        let closed = self.store.remove(&event_id).await?;
        if let Some(inventory) = &closed {
            tracing::info!(reserved = inventory.reserved(), "Inventory closed");
        }
        Ok(closed)
    }

    /// Reserve `quantity` spots and return the spots left afterwards.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] for an unknown event
    /// - [`LedgerError::InsufficientCapacity`] when fewer spots are left;
    ///   the inventory is unchanged
    #[tracing::instrument(skip_all, fields(%event_id, quantity = quantity.get()))]
    pub async fn reserve(&self, event_id: EventId, quantity: Quantity) -> Result<u32> {
        let take = |current: &EventInventory| current.reserve(quantity);
        match self.store.atomic_update(&event_id, &take).await {
            Ok(next) => {
                LedgerMetrics::record_reserve("ok");
                LedgerMetrics::record_spots_left(event_id, next.spots_left());
                tracing::debug!(spots_left = next.spots_left(), "Spots reserved");
                Ok(next.spots_left())
            }
            Err(err) => {
                let outcome = match &err {
                    LedgerError::InsufficientCapacity { available, .. } => {
                        tracing::info!(available, "Reservation refused: not enough spots left");
                        "insufficient"
                    }
                    LedgerError::NotFound { .. } => "not_found",
                    other => {
                        tracing::error!(error = %other, "Reservation failed");
                        "error"
                    }
                };
                LedgerMetrics::record_reserve(outcome);
                Err(err)
            }
        }
    }

    /// Give back `quantity` spots and return the spots left afterwards.
    ///
    /// A release that would exceed capacity is a caller defect. It is logged
    /// at error level and then handled by the ledger's [`OverReleasePolicy`].
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] for an unknown event
    /// - [`LedgerError::OverRelease`] under [`OverReleasePolicy::Reject`];
    ///   the inventory is unchanged
    #[tracing::instrument(skip_all, fields(%event_id, quantity = quantity.get()))]
    pub async fn release(&self, event_id: EventId, quantity: Quantity) -> Result<u32> {
        let policy = self.policy;
        // Set by the evaluation that gets published; earlier CAS attempts
        // are overwritten.
        let clamped = AtomicBool::new(false);
        let give = |current: &EventInventory| match current.release(quantity, OverReleasePolicy::Reject) {
            Err(LedgerError::OverRelease { .. }) if policy == OverReleasePolicy::Clamp => {
                clamped.store(true, Ordering::Relaxed);
                current.release(quantity, policy)
            }
            other => {
                clamped.store(false, Ordering::Relaxed);
                other
            }
        };

        match self.store.atomic_update(&event_id, &give).await {
            Ok(next) => {
                if clamped.load(Ordering::Relaxed) {
                    LedgerMetrics::record_over_release();
                    tracing::error!(
                        capacity = next.capacity().get(),
                        "Over-release clamped at capacity; more spots released than reserved"
                    );
                }
                LedgerMetrics::record_release();
                LedgerMetrics::record_spots_left(event_id, next.spots_left());
                tracing::debug!(spots_left = next.spots_left(), "Spots released");
                Ok(next.spots_left())
            }
            Err(err) => {
                if let LedgerError::OverRelease {
                    available, capacity, ..
                } = &err
                {
                    LedgerMetrics::record_over_release();
                    tracing::error!(
                        available,
                        capacity,
                        "Over-release rejected; more spots released than reserved"
                    );
                }
                Err(err)
            }
        }
    }

    /// Spots left for an event. Reads only; reserves nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] for an unknown event.
    pub async fn peek(&self, event_id: EventId) -> Result<u32> {
        self.inventory(event_id)
            .await
            .map(|inventory| inventory.spots_left())
    }

    /// Full snapshot of an event's inventory.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] for an unknown event.
    pub async fn inventory(&self, event_id: EventId) -> Result<EventInventory> {
        self.store
            .get(&event_id)
            .await?
            .ok_or(LedgerError::NotFound { event_id })
    }
}
