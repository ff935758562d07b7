//! Booking metrics.

use metrics::{counter, describe_counter};

/// Register descriptions for every booking metric.
pub fn describe() {
    describe_counter!("booking_created_total", "Bookings confirmed");
    describe_counter!(
        "booking_compensated_total",
        "Reservations released because a booking could not be completed"
    );
    describe_counter!("booking_cancelled_total", "Bookings cancelled");
}

/// Booking metrics recorder.
pub struct BookingMetrics;

impl BookingMetrics {
    /// Record a confirmed booking.
    pub fn record_created() {
        counter!("booking_created_total").increment(1);
    }

    /// Record a compensating release.
    pub fn record_compensated() {
        counter!("booking_compensated_total").increment(1);
    }

    /// Record a cancellation.
    pub fn record_cancelled() {
        counter!("booking_cancelled_total").increment(1);
    }
}
