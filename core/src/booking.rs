//! Booking records.
//!
//! A booking is created `Confirmed` with its spots already reserved in the
//! ledger and moves to `Cancelled` at most once.

use crate::ids::{BookingId, ChildId, EventId, UserId};
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Booking lifecycle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting confirmation (not produced by the reservation flow)
    Pending,
    /// Spots are held for the booking
    Confirmed,
    /// Spots were released
    Cancelled,
}

/// Payment status, tracked for display only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Not paid yet
    Pending,
    /// Paid
    Paid,
    /// Payment failed
    Failed,
    /// Refunded
    Refunded,
}

/// A booking of one or more children onto an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Booking ID
    pub id: BookingId,
    /// Booked event
    pub event_id: EventId,
    /// Booked children; one spot each
    pub child_ids: Vec<ChildId>,
    /// Lifecycle status
    pub status: BookingStatus,
    /// When the booking was made
    pub booking_date: DateTime<Utc>,
    /// Price per child times party size
    pub total_amount_cents: Money,
    /// Booking parent
    pub user_id: UserId,
    /// Payment status
    pub payment_status: PaymentStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Create a confirmed booking whose spots are already reserved.
    #[must_use]
    pub fn confirmed(
        event_id: EventId,
        child_ids: Vec<ChildId>,
        user_id: UserId,
        total_amount_cents: Money,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BookingId::new(),
            event_id,
            child_ids,
            status: BookingStatus::Confirmed,
            booking_date: now,
            total_amount_cents,
            user_id,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of spots held by this booking.
    #[must_use]
    pub fn party_size(&self) -> u32 {
        u32::try_from(self.child_ids.len()).unwrap_or(u32::MAX)
    }

    /// Whether the booking still holds spots.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }
}
