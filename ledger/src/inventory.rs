//! Per-event inventory state and its transitions.
//!
//! Transitions are pure: they take the current [`EventInventory`] and return
//! the next one, or an error describing why the transition is not allowed.
//! Stores apply them atomically.

use crate::error::{LedgerError, Result};
use only4kiddos_core::EventId;
use serde::Serialize;
use std::num::NonZeroU32;

/// Total number of spots of an event, fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Capacity(NonZeroU32);

impl Capacity {
    /// Create a capacity.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidCapacity`] for zero.
    pub fn new(spots: u32) -> Result<Self> {
        NonZeroU32::new(spots)
            .map(Self)
            .ok_or(LedgerError::InvalidCapacity)
    }

    /// Number of spots.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

/// Number of spots reserved or released in one call, always at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// One spot.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidQuantity`] for zero.
    pub fn new(spots: u32) -> Result<Self> {
        NonZeroU32::new(spots)
            .map(Self)
            .ok_or(LedgerError::InvalidQuantity)
    }

    /// Number of spots.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

/// What a release does when it would exceed capacity.
///
/// Both policies keep `spots_left <= capacity`; they differ in whether the
/// caller hears about it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverReleasePolicy {
    /// Fail with [`LedgerError::OverRelease`] and leave the inventory unchanged.
    #[default]
    Reject,
    /// Saturate at capacity and report success.
    Clamp,
}

impl OverReleasePolicy {
    /// Parse a configuration value (`reject` or `clamp`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "reject" => Some(Self::Reject),
            "clamp" => Some(Self::Clamp),
            _ => None,
        }
    }
}

/// Capacity counter pair for one event.
///
/// Invariant: `spots_left <= capacity`. Every constructor and transition
/// preserves it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInventory {
    event_id: EventId,
    capacity: Capacity,
    spots_left: u32,
}

impl EventInventory {
    /// A fresh inventory with every spot available.
    #[must_use]
    pub const fn open(event_id: EventId, capacity: Capacity) -> Self {
        Self {
            event_id,
            capacity,
            spots_left: capacity.get(),
        }
    }

    /// Rebuild an inventory from stored parts.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] when the parts break the invariant.
    pub fn from_parts(event_id: EventId, capacity: Capacity, spots_left: u32) -> Result<Self> {
        if spots_left > capacity.get() {
            return Err(LedgerError::Store(format!(
                "corrupt inventory for event {event_id}: {spots_left} spots left of {}",
                capacity.get()
            )));
        }
        Ok(Self {
            event_id,
            capacity,
            spots_left,
        })
    }

    /// Event this inventory belongs to.
    #[must_use]
    pub const fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Fixed capacity.
    #[must_use]
    pub const fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Spots still available.
    #[must_use]
    pub const fn spots_left(&self) -> u32 {
        self.spots_left
    }

    /// Spots currently held by bookings.
    #[must_use]
    pub const fn reserved(&self) -> u32 {
        self.capacity.get() - self.spots_left
    }

    /// Take `quantity` spots.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientCapacity`] when fewer than
    /// `quantity` spots are left.
    pub fn reserve(&self, quantity: Quantity) -> Result<Self> {
        match self.spots_left.checked_sub(quantity.get()) {
            Some(spots_left) => Ok(Self {
                spots_left,
                ..*self
            }),
            None => Err(LedgerError::InsufficientCapacity {
                event_id: self.event_id,
                requested: quantity.get(),
                available: self.spots_left,
            }),
        }
    }

    /// Give back `quantity` spots.
    ///
    /// # Errors
    ///
    /// Under [`OverReleasePolicy::Reject`], returns
    /// [`LedgerError::OverRelease`] when the release would exceed capacity.
    pub fn release(&self, quantity: Quantity, policy: OverReleasePolicy) -> Result<Self> {
        let capacity = self.capacity.get();
        if let Some(wanted) = self.spots_left.checked_add(quantity.get()) {
            if wanted <= capacity {
                return Ok(Self {
                    spots_left: wanted,
                    ..*self
                });
            }
        }
        match policy {
            OverReleasePolicy::Clamp => Ok(Self {
                spots_left: capacity,
                ..*self
            }),
            OverReleasePolicy::Reject => Err(LedgerError::OverRelease {
                event_id: self.event_id,
                requested: quantity.get(),
                available: self.spots_left,
                capacity,
            }),
        }
    }

    /// Whether `next` describes the same event with the same capacity.
    pub(crate) fn same_identity(&self, next: &Self) -> bool {
        self.event_id == next.event_id && self.capacity == next.capacity
    }
}
