//! Money value object (cents-based to avoid floating point errors)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents money in cents to avoid floating-point arithmetic errors
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Zero amount, used for free events.
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Multiplies by a count (price per child times party size).
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub const fn checked_mul(&self, count: u32) -> Option<Self> {
        match self.0.checked_mul(count as u64) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}
