//! Event catalog: publishing rules, filters, sorting and pagination.

#![allow(clippy::unwrap_used)]

use only4kiddos_booking::{BookingError, Services};
use only4kiddos_core::{
    AgeRange, AuthContext, DateRange, EventCategory, EventFilter, EventPatch, EventView, Money,
    Page, PriceRange, Role, ValidationError,
};
use only4kiddos_ledger::{CapacitySource, ReservationLedger};
use only4kiddos_testing::fixtures::{self, event_date};
use only4kiddos_testing::test_clock;
use std::sync::Arc;

fn services() -> Services {
    Services::new(
        only4kiddos_booking::Repositories::in_memory(),
        ReservationLedger::in_memory(),
        Arc::new(test_clock()),
    )
}

fn titles(page: &Page<EventView>) -> Vec<String> {
    page.items
        .iter()
        .map(|view| view.event.details.title.clone())
        .collect()
}

#[tokio::test]
async fn only_hosts_publish_and_inventory_opens_at_capacity() {
    let services = services();
    assert!(matches!(
        services
            .catalog
            .create(&fixtures::parent(), fixtures::new_event("Story Time", 10))
            .await,
        Err(BookingError::Forbidden { .. })
    ));

    let view = services
        .catalog
        .create(&fixtures::host(), fixtures::new_event("Story Time", 10))
        .await
        .unwrap();
    assert_eq!(view.spots_left, 10);
    assert_eq!(view.event.created_by, fixtures::host().user_id);
    assert_eq!(services.ledger.peek(view.event.id).await, Ok(10));
    assert_eq!(
        services.catalog.get_capacity(&view.event.id).await,
        Ok(Some(10))
    );
}

#[tokio::test]
async fn invalid_events_are_rejected_without_an_inventory() {
    let services = services();
    let mut details = fixtures::new_event("Story Time", 10);
    details.capacity = 0;
    assert!(matches!(
        services.catalog.create(&fixtures::host(), details).await,
        Err(BookingError::Validation(_))
    ));
    let page = services
        .catalog
        .list(&EventFilter::default(), None)
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn views_reflect_live_availability() {
    let services = services();
    let parent = fixtures::parent();
    let event_id = services
        .catalog
        .create(&fixtures::host(), fixtures::new_event("Story Time", 4))
        .await
        .unwrap()
        .event
        .id;
    let child = services
        .children
        .create(&parent, fixtures::new_child("Emma", 6))
        .await
        .unwrap();
    services
        .bookings
        .create(&parent, event_id, vec![child.id])
        .await
        .unwrap();

    let view = services.catalog.get(event_id, Some(&parent)).await.unwrap();
    assert_eq!(view.spots_left, 3);
    let availability = services.catalog.availability(event_id).await.unwrap();
    assert_eq!(availability.reserved(), 1);
}

#[tokio::test]
async fn capacity_is_immutable_and_updates_need_ownership() {
    let services = services();
    let host = fixtures::host();
    let event_id = services
        .catalog
        .create(&host, fixtures::new_event("Story Time", 10))
        .await
        .unwrap()
        .event
        .id;

    let resize = EventPatch {
        capacity: Some(50),
        ..EventPatch::default()
    };
    assert_eq!(
        services.catalog.update(&host, event_id, resize).await,
        Err(BookingError::Validation(ValidationError::Immutable {
            field: "capacity"
        }))
    );

    let rename = EventPatch {
        title: Some("Puppet Show".to_string()),
        ..EventPatch::default()
    };
    let other_host = only4kiddos_core::AuthContext::new(
        only4kiddos_core::UserId::new("host-2"),
        "host-2@example.com",
        only4kiddos_core::Role::Host,
    );
    assert!(matches!(
        services
            .catalog
            .update(&other_host, event_id, rename.clone())
            .await,
        Err(BookingError::Forbidden { .. })
    ));
    assert!(matches!(
        services
            .catalog
            .update(&fixtures::parent(), event_id, rename.clone())
            .await,
        Err(BookingError::Forbidden { .. })
    ));

    let updated = services
        .catalog
        .update(&fixtures::admin(), event_id, rename)
        .await
        .unwrap();
    assert_eq!(updated.event.details.title, "Puppet Show");
    assert_eq!(updated.spots_left, 10);
}

#[tokio::test]
async fn delete_closes_the_inventory() {
    let services = services();
    let host = fixtures::host();
    let event_id = services
        .catalog
        .create(&host, fixtures::new_event("Story Time", 10))
        .await
        .unwrap()
        .event
        .id;

    assert!(matches!(
        services.catalog.delete(&fixtures::parent(), event_id).await,
        Err(BookingError::Forbidden { .. })
    ));
    services.catalog.delete(&host, event_id).await.unwrap();

    assert_eq!(
        services.catalog.get(event_id, None).await,
        Err(BookingError::EventNotFound(event_id))
    );
    assert!(services.ledger.peek(event_id).await.is_err());
    assert_eq!(services.catalog.get_capacity(&event_id).await, Ok(None));
}

#[tokio::test]
async fn filters_sort_and_paginate() {
    let services = services();
    let host = fixtures::host();

    let mut soccer = fixtures::new_event_on("Soccer Skills Training", 20, event_date(5));
    soccer.category = EventCategory::Sports;
    soccer.age_range = AgeRange { min: 6, max: 14 };
    soccer.price_cents = Money::from_cents(3_000);
    soccer.tags = vec!["outdoor".to_string()];

    let mut toddlers = fixtures::new_event_on("Toddler Music", 8, event_date(2));
    toddlers.category = EventCategory::Music;
    toddlers.age_range = AgeRange { min: 1, max: 3 };
    toddlers.price_cents = Money::ZERO;

    let art = fixtures::new_event_on("Art & Craft Workshop", 15, event_date(7));

    for details in [soccer, toddlers, art] {
        services.catalog.create(&host, details).await.unwrap();
    }

    let all = services
        .catalog
        .list(&EventFilter::default(), None)
        .await
        .unwrap();
    assert_eq!(
        titles(&all),
        ["Toddler Music", "Soccer Skills Training", "Art & Craft Workshop"]
    );

    let by_category = EventFilter {
        categories: vec![EventCategory::Sports, EventCategory::Music],
        ..EventFilter::default()
    };
    let page = services.catalog.list(&by_category, None).await.unwrap();
    assert_eq!(titles(&page), ["Toddler Music", "Soccer Skills Training"]);

    let by_age = EventFilter {
        age_range: Some(AgeRange { min: 13, max: 16 }),
        ..EventFilter::default()
    };
    let page = services.catalog.list(&by_age, None).await.unwrap();
    assert_eq!(titles(&page), ["Soccer Skills Training"]);

    let free = EventFilter {
        price_range: Some(PriceRange {
            min: Money::ZERO,
            max: Money::ZERO,
        }),
        ..EventFilter::default()
    };
    let page = services.catalog.list(&free, None).await.unwrap();
    assert_eq!(titles(&page), ["Toddler Music"]);

    let this_week = EventFilter {
        date_range: Some(DateRange {
            start: event_date(3),
            end: event_date(6),
        }),
        ..EventFilter::default()
    };
    let page = services.catalog.list(&this_week, None).await.unwrap();
    assert_eq!(titles(&page), ["Soccer Skills Training"]);

    let search = EventFilter {
        search_query: Some("OUTDOOR".to_string()),
        ..EventFilter::default()
    };
    let page = services.catalog.list(&search, None).await.unwrap();
    assert_eq!(titles(&page), ["Soccer Skills Training"]);

    let second_page = EventFilter {
        limit: 2,
        offset: 2,
        ..EventFilter::default()
    };
    let page = services.catalog.list(&second_page, None).await.unwrap();
    assert_eq!(titles(&page), ["Art & Craft Workshop"]);
    assert_eq!(page.total, 3);
    assert!(!page.has_more);

    let first_page = EventFilter {
        limit: 2,
        ..EventFilter::default()
    };
    assert!(services.catalog.list(&first_page, None).await.unwrap().has_more);

    let too_big = EventFilter {
        limit: 500,
        ..EventFilter::default()
    };
    assert!(matches!(
        services.catalog.list(&too_big, None).await,
        Err(BookingError::Validation(_))
    ));
}

#[tokio::test]
async fn demoted_host_cannot_delete_their_events() {
    let services = services();
    let host = fixtures::host();
    let event_id = services
        .catalog
        .create(&host, fixtures::new_event("Story Time", 10))
        .await
        .unwrap()
        .event
        .id;

    let demoted = AuthContext::new(host.user_id.clone(), host.email.clone(), Role::User);
    assert!(matches!(
        services.catalog.delete(&demoted, event_id).await,
        Err(BookingError::Forbidden { .. })
    ));
    assert_eq!(services.ledger.peek(event_id).await, Ok(10));
    services.catalog.delete(&fixtures::admin(), event_id).await.unwrap();
}

#[tokio::test]
async fn events_without_an_inventory_are_left_out_of_listings() {
    let services = services();
    let host = fixtures::host();
    let closing = services
        .catalog
        .create(&host, fixtures::new_event("Story Time", 10))
        .await
        .unwrap()
        .event
        .id;
    services
        .catalog
        .create(&host, fixtures::new_event("Puppet Show", 8))
        .await
        .unwrap();

    // Same state a concurrent delete leaves between the repository and the
    // ledger.
    services.ledger.close(closing).await.unwrap();

    let page = services
        .catalog
        .list(&EventFilter::default(), None)
        .await
        .unwrap();
    assert_eq!(titles(&page), ["Puppet Show"]);
    assert_eq!(page.total, 1);
    assert_eq!(
        services.catalog.get(closing, None).await,
        Err(BookingError::EventNotFound(closing))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn listing_stays_available_while_events_come_and_go() {
    let services = services();
    let host = fixtures::host();
    services
        .catalog
        .create(&host, fixtures::new_event("Soccer Skills Training", 20))
        .await
        .unwrap();

    let churn = {
        let services = services.clone();
        tokio::spawn(async move {
            for i in 0..500 {
                let event_id = services
                    .catalog
                    .create(&host, fixtures::new_event(&format!("Pop-up {i}"), 5))
                    .await
                    .unwrap()
                    .event
                    .id;
                services.catalog.delete(&host, event_id).await.unwrap();
            }
        })
    };

    let mut lists = 0;
    while !churn.is_finished() {
        let page = services
            .catalog
            .list(&EventFilter::default(), None)
            .await
            .unwrap();
        assert!(titles(&page).iter().any(|title| title == "Soccer Skills Training"));
        lists += 1;
        tokio::task::yield_now().await;
    }
    churn.await.unwrap();
    assert!(lists > 0);
}
