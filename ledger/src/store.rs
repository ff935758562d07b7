//! Storage seam for inventories.
//!
//! An [`InventoryStore`] owns the per-event [`EventInventory`] records and
//! applies transitions to them atomically. The ledger never reads a record,
//! decides, and writes it back in separate steps; it hands the store a
//! transition and the store runs read, decide and write as one unit.
//!
//! Two backends ship with the crate:
//!
//! - [`MemoryInventoryStore`](crate::memory::MemoryInventoryStore): one mutex per event
//! - [`AtomicInventoryStore`](crate::atomic::AtomicInventoryStore): lock-free compare-and-swap
//!
//! A database-backed store would implement the same trait with a conditional
//! update (`... WHERE spots_left >= $n`) or a row lock.

use crate::error::Result;
use crate::inventory::EventInventory;
use async_trait::async_trait;
use only4kiddos_core::EventId;

/// A transition from the current inventory to the next one.
///
/// Transitions must be pure. A compare-and-swap store may evaluate the same
/// transition more than once when it loses a race.
pub type Transition<'a> = &'a (dyn Fn(&EventInventory) -> Result<EventInventory> + Send + Sync);

/// Persistent home of every event's inventory.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Current inventory of an event, if one is open.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`](crate::LedgerError::Store) when the backend fails.
    async fn get(&self, event_id: &EventId) -> Result<Option<EventInventory>>;

    /// Insert a new inventory.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AlreadyExists`](crate::LedgerError::AlreadyExists)
    /// when the event already has one.
    async fn put(&self, inventory: EventInventory) -> Result<()>;

    /// Remove an inventory, returning it if it existed.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`](crate::LedgerError::Store) when the backend fails.
    async fn remove(&self, event_id: &EventId) -> Result<Option<EventInventory>>;

    /// Apply `transition` to an event's inventory atomically.
    ///
    /// No other update of the same event may interleave between reading the
    /// current value and writing the result. When the transition fails the
    /// stored value is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`](crate::LedgerError::NotFound) for an
    /// unknown event, or whatever error the transition returns.
    async fn atomic_update(&self, event_id: &EventId, transition: Transition<'_>) -> Result<EventInventory>;
}

/// Read access to the capacity an event was created with.
///
/// The ledger uses this to open inventories for events that exist in the
/// catalog but have no inventory yet.
#[async_trait]
pub trait CapacitySource: Send + Sync {
    /// Capacity of an event, or `None` if the catalog does not know it.
    ///
    /// # Errors
    ///
    /// Returns the catalog's error message when the lookup fails.
    async fn get_capacity(&self, event_id: &EventId) -> std::result::Result<Option<u32>, String>;
}
