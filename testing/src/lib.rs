//! # Only4kiddos Testing
//!
//! Test support shared by the Only4kiddos crates.
//!
//! This crate provides:
//! - A fixed [`Clock`] so timestamps in tests are reproducible
//! - Fixtures for callers, events and children
//! - `proptest` strategies for ledger operation sequences
//!
//! ## Example
//!
//! ```
//! use only4kiddos_core::environment::Clock;
//! use only4kiddos_testing::{fixtures, test_clock};
//!
//! let clock = test_clock();
//! let host = fixtures::host();
//! let event = fixtures::new_event("Soccer Skills", 20);
//! assert!(host.can_host());
//! assert_eq!(event.capacity, 20);
//! assert_eq!(clock.now(), clock.now());
//! ```

use chrono::{DateTime, Utc};
use only4kiddos_core::environment::Clock;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use only4kiddos_testing::mocks::FixedClock;
    /// use only4kiddos_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Fixed clock at 2025-01-01 00:00:00 UTC.
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }
}

/// Ready-made callers and inputs.
pub mod fixtures {
    use chrono::{DateTime, Duration, Utc};
    use only4kiddos_core::{
        AgeRange, AuthContext, EventCategory, Money, NewChild, NewEvent, Role, UserId,
    };

    /// A parent account.
    #[must_use]
    pub fn parent() -> AuthContext {
        parent_named("parent-1")
    }

    /// A parent account with the given subject.
    #[must_use]
    pub fn parent_named(user_id: &str) -> AuthContext {
        AuthContext::new(UserId::new(user_id), format!("{user_id}@example.com"), Role::User)
    }

    /// An account allowed to publish events.
    #[must_use]
    pub fn host() -> AuthContext {
        AuthContext::new(UserId::new("host-1"), "host-1@example.com", Role::Host)
    }

    /// An administrator.
    #[must_use]
    pub fn admin() -> AuthContext {
        AuthContext::new(UserId::new("admin-1"), "admin-1@example.com", Role::Admin)
    }

    /// A valid event for ages 5 to 12 priced at $25.00, dated relative to
    /// [`test_clock`](crate::test_clock).
    #[must_use]
    pub fn new_event(title: &str, capacity: u32) -> NewEvent {
        new_event_on(title, capacity, event_date(7))
    }

    /// Like [`new_event`] with an explicit date.
    #[must_use]
    pub fn new_event_on(title: &str, capacity: u32, date: DateTime<Utc>) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            description: format!("{title} for curious kids"),
            image_url: "https://images.example.com/event.png".to_string(),
            date,
            time: "10:00".to_string(),
            location: "Community Center".to_string(),
            address: "123 Main Street".to_string(),
            price_cents: Money::from_cents(2_500),
            age_range: AgeRange { min: 5, max: 12 },
            category: EventCategory::Arts,
            host_name: "Sarah Johnson".to_string(),
            host_image: "https://images.example.com/host.png".to_string(),
            capacity,
            tags: vec!["creative".to_string()],
            accessibility_features: Vec::new(),
            latitude: None,
            longitude: None,
        }
    }

    /// `days` days after the test clock's instant.
    #[must_use]
    pub fn event_date(days: i64) -> DateTime<Utc> {
        use only4kiddos_core::environment::Clock;
        crate::test_clock().now() + Duration::days(days)
    }

    /// A valid child profile.
    #[must_use]
    pub fn new_child(name: &str, age: u8) -> NewChild {
        NewChild {
            name: name.to_string(),
            age,
            interests: vec!["painting".to_string()],
            allergies: Vec::new(),
            special_needs: Vec::new(),
            avatar_color: "#FF6B6B".to_string(),
        }
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// One ledger call in a generated sequence.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CapacityOp {
        /// Reserve this many spots
        Reserve(u32),
        /// Release this many spots
        Release(u32),
    }

    impl CapacityOp {
        /// Quantity carried by the operation.
        #[must_use]
        pub const fn quantity(self) -> u32 {
            match self {
                Self::Reserve(quantity) | Self::Release(quantity) => quantity,
            }
        }
    }

    /// Event capacities from a single spot to a large venue.
    pub fn capacity() -> impl Strategy<Value = u32> {
        prop_oneof![1..=5_u32, 1..=200_u32, Just(u32::MAX)]
    }

    /// A single operation with a quantity in `1..=max_quantity`.
    pub fn capacity_op(max_quantity: u32) -> impl Strategy<Value = CapacityOp> {
        let max_quantity = max_quantity.max(1);
        prop_oneof![
            (1..=max_quantity).prop_map(CapacityOp::Reserve),
            (1..=max_quantity).prop_map(CapacityOp::Release),
        ]
    }

    /// Up to `len` operations, each with a quantity in `1..=max_quantity`.
    pub fn capacity_ops(max_quantity: u32, len: usize) -> impl Strategy<Value = Vec<CapacityOp>> {
        prop::collection::vec(capacity_op(max_quantity), 0..=len)
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
