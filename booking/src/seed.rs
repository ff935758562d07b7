//! Sample catalog for development servers.

use crate::catalog::EventCatalog;
use crate::error::Result;
use chrono::Duration;
use only4kiddos_core::environment::Clock;
use only4kiddos_core::{
    AgeRange, AuthContext, EventCategory, EventView, Money, NewEvent, Role, UserId,
};

/// Subject of the host that owns the sample events.
pub const SAMPLE_HOST_ID: &str = "system-host";

fn sample_host() -> AuthContext {
    AuthContext::new(UserId::new(SAMPLE_HOST_ID), "events@only4kiddos.app", Role::Host)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

/// Two sample events dated a few days after `clock.now()`.
#[must_use]
pub fn sample_events(clock: &dyn Clock) -> Vec<NewEvent> {
    let now = clock.now();
    vec![
        NewEvent {
            title: "Art & Craft Workshop".to_string(),
            description: "Creative art session for kids to explore painting and crafting".to_string(),
            image_url: "https://images.unsplash.com/photo-1513475382585-d06e58bcb0e0?w=400".to_string(),
            date: now + Duration::days(7),
            time: "10:00".to_string(),
            location: "Community Center".to_string(),
            address: "123 Main Street, City".to_string(),
            price_cents: Money::from_cents(2_500),
            age_range: AgeRange { min: 5, max: 12 },
            category: EventCategory::Arts,
            host_name: "Sarah Johnson".to_string(),
            host_image: "https://images.unsplash.com/photo-1494790108755-2616b612b47c?w=100".to_string(),
            capacity: 15,
            tags: strings(&["creative", "indoor", "beginner-friendly"]),
            accessibility_features: strings(&["wheelchair accessible", "visual aids available"]),
            latitude: Some(40.7128),
            longitude: Some(-74.0060),
        },
        NewEvent {
            title: "Soccer Skills Training".to_string(),
            description: "Fun soccer training session for kids of all skill levels".to_string(),
            image_url: "https://images.unsplash.com/photo-1574629810360-7efbbe195018?w=400".to_string(),
            date: now + Duration::days(5),
            time: "15:30".to_string(),
            location: "City Park".to_string(),
            address: "456 Park Avenue, City".to_string(),
            price_cents: Money::from_cents(3_000),
            age_range: AgeRange { min: 6, max: 14 },
            category: EventCategory::Sports,
            host_name: "Mike Chen".to_string(),
            host_image: "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=100".to_string(),
            capacity: 20,
            tags: strings(&["outdoor", "sports", "team-building"]),
            accessibility_features: strings(&["adapted equipment available"]),
            latitude: Some(40.7589),
            longitude: Some(-73.9851),
        },
    ]
}

/// Publish the sample events through the catalog, opening their inventories.
///
/// # Errors
///
/// Returns the first catalog error.
pub async fn seed_sample_data(catalog: &EventCatalog, clock: &dyn Clock) -> Result<Vec<EventView>> {
    let host = sample_host();
    let mut created = Vec::new();
    for details in sample_events(clock) {
        created.push(catalog.create(&host, details).await?);
    }
    tracing::info!(count = created.len(), "Seeded sample events");
    Ok(created)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryEventRepository, InMemoryFavoriteRepository};
    use only4kiddos_ledger::ReservationLedger;
    use only4kiddos_testing::test_clock;
    use std::sync::Arc;

    #[tokio::test]
    async fn seeded_events_open_full_inventories() {
        let clock = test_clock();
        let ledger = ReservationLedger::in_memory();
        let catalog = EventCatalog::new(
            Arc::new(InMemoryEventRepository::new()),
            Arc::new(InMemoryFavoriteRepository::new()),
            ledger.clone(),
            Arc::new(clock.clone()),
        );

        let created = seed_sample_data(&catalog, &clock).await.unwrap();
        assert_eq!(created.len(), 2);
        for view in created {
            assert_eq!(view.spots_left, view.event.capacity());
            assert_eq!(ledger.peek(view.event.id).await.unwrap(), view.event.capacity());
            assert_eq!(view.event.created_by.as_str(), SAMPLE_HOST_ID);
        }
    }
}
