//! Ledger metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! process installs a recorder.

use metrics::{counter, describe_counter, describe_gauge, gauge};
use only4kiddos_core::EventId;

/// Register descriptions for every ledger metric.
pub fn describe() {
    describe_counter!(
        "ledger_reserve_total",
        "Reserve calls by outcome (ok, insufficient, not_found, error)"
    );
    describe_counter!("ledger_release_total", "Successful release calls");
    describe_counter!(
        "ledger_over_release_total",
        "Releases that would have exceeded capacity"
    );
    describe_gauge!("ledger_spots_left", "Spots left per event after the last change");
}

/// Ledger metrics recorder.
pub struct LedgerMetrics;

impl LedgerMetrics {
    /// Record a reserve call.
    pub fn record_reserve(outcome: &'static str) {
        counter!("ledger_reserve_total", "outcome" => outcome).increment(1);
    }

    /// Record a successful release.
    pub fn record_release() {
        counter!("ledger_release_total").increment(1);
    }

    /// Record an over-release, whatever the policy did with it.
    pub fn record_over_release() {
        counter!("ledger_over_release_total").increment(1);
    }

    /// Publish the current spots left of an event.
    pub fn record_spots_left(event_id: EventId, spots_left: u32) {
        gauge!("ledger_spots_left", "event_id" => event_id.to_string()).set(f64::from(spots_left));
    }
}
