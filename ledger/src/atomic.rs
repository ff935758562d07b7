//! Lock-free inventory store.
//!
//! Each event keeps its `spots_left` in an [`AtomicU32`]. Updates read the
//! counter, evaluate the transition and publish the result with a
//! compare-and-swap, retrying when another update won the race.

use crate::error::{LedgerError, Result};
use crate::inventory::{Capacity, EventInventory};
use crate::store::{InventoryStore, Transition};
use async_trait::async_trait;
use only4kiddos_core::EventId;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug)]
struct Slot {
    capacity: Capacity,
    spots_left: AtomicU32,
}

impl Slot {
    fn snapshot(&self, event_id: EventId) -> Result<EventInventory> {
        EventInventory::from_parts(
            event_id,
            self.capacity,
            self.spots_left.load(Ordering::Acquire),
        )
    }
}

/// Inventory store whose counters are updated with compare-and-swap.
///
/// Transitions may run more than once per update and must not have side
/// effects.
#[derive(Debug, Default)]
pub struct AtomicInventoryStore {
    events: RwLock<HashMap<EventId, Arc<Slot>>>,
}

impl AtomicInventoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> LedgerError {
    LedgerError::Store("inventory map lock poisoned".to_string())
}

#[async_trait]
impl InventoryStore for AtomicInventoryStore {
    async fn get(&self, event_id: &EventId) -> Result<Option<EventInventory>> {
        let events = self.events.read().map_err(poisoned)?;
        events
            .get(event_id)
            .map(|slot| slot.snapshot(*event_id))
            .transpose()
    }

    async fn put(&self, inventory: EventInventory) -> Result<()> {
        let mut events = self.events.write().map_err(poisoned)?;
        match events.entry(inventory.event_id()) {
            Entry::Occupied(_) => Err(LedgerError::AlreadyExists {
                event_id: inventory.event_id(),
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(Slot {
                    capacity: inventory.capacity(),
                    spots_left: AtomicU32::new(inventory.spots_left()),
                }));
                Ok(())
            }
        }
    }

    async fn remove(&self, event_id: &EventId) -> Result<Option<EventInventory>> {
        let slot = self.events.write().map_err(poisoned)?.remove(event_id);
        slot.map(|slot| slot.snapshot(*event_id)).transpose()
    }

    async fn atomic_update(&self, event_id: &EventId, transition: Transition<'_>) -> Result<EventInventory> {
        let events = self.events.read().map_err(poisoned)?;
        let slot = events.get(event_id).ok_or(LedgerError::NotFound {
            event_id: *event_id,
        })?;

        let mut observed = slot.spots_left.load(Ordering::Acquire);
        loop {
            let current = EventInventory::from_parts(*event_id, slot.capacity, observed)?;
            let next = transition(&current)?;
            if !current.same_identity(&next) {
                return Err(LedgerError::Store(format!(
                    "transition for event {event_id} changed its identity or capacity"
                )));
            }
            match slot.spots_left.compare_exchange_weak(
                observed,
                next.spots_left(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(next),
                Err(actual) => observed = actual,
            }
        }
    }
}
