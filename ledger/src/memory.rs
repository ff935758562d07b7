//! In-memory inventory store with one lock per event.

use crate::error::{LedgerError, Result};
use crate::inventory::EventInventory;
use crate::store::{InventoryStore, Transition};
use async_trait::async_trait;
use only4kiddos_core::EventId;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

type Slot = Arc<Mutex<EventInventory>>;

/// Inventory store backed by a map of per-event mutexes.
///
/// Updates of different events never contend on the same lock; updates of
/// the same event are serialized by that event's mutex. The outer map lock
/// is only taken for writing when an inventory is put or removed.
#[derive(Debug, Default)]
pub struct MemoryInventoryStore {
    events: RwLock<HashMap<EventId, Slot>>,
}

impl MemoryInventoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open inventories.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] if the map lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.events.read().map_err(poisoned)?.len())
    }

    /// Whether no inventory is open.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] if the map lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(_: PoisonError<T>) -> LedgerError {
    LedgerError::Store("inventory lock poisoned".to_string())
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn get(&self, event_id: &EventId) -> Result<Option<EventInventory>> {
        let events = self.events.read().map_err(poisoned)?;
        match events.get(event_id) {
            Some(slot) => Ok(Some(*slot.lock().map_err(poisoned)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, inventory: EventInventory) -> Result<()> {
        let mut events = self.events.write().map_err(poisoned)?;
        match events.entry(inventory.event_id()) {
            Entry::Occupied(_) => Err(LedgerError::AlreadyExists {
                event_id: inventory.event_id(),
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(Mutex::new(inventory)));
                Ok(())
            }
        }
    }

    async fn remove(&self, event_id: &EventId) -> Result<Option<EventInventory>> {
        let slot = self.events.write().map_err(poisoned)?.remove(event_id);
        match slot {
            Some(slot) => Ok(Some(*slot.lock().map_err(poisoned)?)),
            None => Ok(None),
        }
    }

    async fn atomic_update(&self, event_id: &EventId, transition: Transition<'_>) -> Result<EventInventory> {
        // The map read guard stays alive while the event lock is held so a
        // concurrent remove cannot detach the slot mid-update.
        let events = self.events.read().map_err(poisoned)?;
        let slot = events.get(event_id).ok_or(LedgerError::NotFound {
            event_id: *event_id,
        })?;
        let mut current = slot.lock().map_err(poisoned)?;
        let next = transition(&current)?;
        if !current.same_identity(&next) {
            return Err(LedgerError::Store(format!(
                "transition for event {event_id} changed its identity or capacity"
            )));
        }
        *current = next;
        Ok(next)
    }
}
