//! # Only4kiddos Ledger
//!
//! The reservation ledger owns the capacity counter of every event and is
//! the only component allowed to change it.
//!
//! ## Guarantees
//!
//! - `0 <= spots_left <= capacity` for every observer, under any
//!   interleaving of concurrent calls.
//! - `reserve` checks and decrements as one atomic step per event, so an
//!   event is never oversold.
//! - A failed call leaves the inventory exactly as it was.
//!
//! ## Layout
//!
//! - [`inventory`]: the per-event state and its pure transitions
//! - [`store`]: the [`InventoryStore`] seam that applies transitions atomically
//! - [`memory`] and [`atomic`]: the two shipped store backends
//! - [`ledger`]: [`ReservationLedger`], the public entry point
//!
//! ## Example
//!
//! ```
//! use only4kiddos_core::EventId;
//! use only4kiddos_ledger::{LedgerError, Quantity, ReservationLedger};
//!
//! # tokio_test::block_on(async {
//! let ledger = ReservationLedger::in_memory();
//! let event_id = EventId::new();
//! ledger.open(event_id, 20).await?;
//!
//! assert_eq!(ledger.reserve(event_id, Quantity::new(12)?).await?, 8);
//! assert_eq!(ledger.release(event_id, Quantity::new(12)?).await?, 20);
//! # Ok::<(), LedgerError>(())
//! # }).unwrap();
//! ```

pub mod atomic;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod memory;
pub mod metrics;
pub mod store;

pub use atomic::AtomicInventoryStore;
pub use error::{LedgerError, Result};
pub use inventory::{Capacity, EventInventory, OverReleasePolicy, Quantity};
pub use ledger::ReservationLedger;
pub use memory::MemoryInventoryStore;
pub use store::{CapacitySource, InventoryStore, Transition};
