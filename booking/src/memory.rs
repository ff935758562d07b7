//! In-memory repositories.

use crate::error::{BookingError, Result};
use crate::repository::{BookingRepository, ChildRepository, EventRepository, FavoriteRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use only4kiddos_core::{Booking, BookingId, BookingStatus, Child, ChildId, Event, EventId, UserId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| BookingError::Repository("repository lock poisoned".to_string()))
}

/// Events in a hash map.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    events: Mutex<HashMap<EventId, Event>>,
}

impl InMemoryEventRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn all(&self) -> Result<Vec<Event>> {
        Ok(lock(&self.events)?.values().cloned().collect())
    }

    async fn get(&self, id: &EventId) -> Result<Option<Event>> {
        Ok(lock(&self.events)?.get(id).cloned())
    }

    async fn save(&self, event: Event) -> Result<()> {
        lock(&self.events)?.insert(event.id, event);
        Ok(())
    }

    async fn delete(&self, id: &EventId) -> Result<bool> {
        Ok(lock(&self.events)?.remove(id).is_some())
    }
}

/// Children in a hash map.
#[derive(Debug, Default)]
pub struct InMemoryChildRepository {
    children: Mutex<HashMap<ChildId, Child>>,
}

impl InMemoryChildRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChildRepository for InMemoryChildRepository {
    async fn for_parent(&self, parent_id: &UserId) -> Result<Vec<Child>> {
        Ok(lock(&self.children)?
            .values()
            .filter(|child| &child.parent_id == parent_id)
            .cloned()
            .collect())
    }

    async fn get(&self, id: &ChildId) -> Result<Option<Child>> {
        Ok(lock(&self.children)?.get(id).cloned())
    }

    async fn save(&self, child: Child) -> Result<()> {
        lock(&self.children)?.insert(child.id, child);
        Ok(())
    }

    async fn delete(&self, id: &ChildId) -> Result<bool> {
        Ok(lock(&self.children)?.remove(id).is_some())
    }
}

/// Bookings in a hash map.
#[derive(Debug, Default)]
pub struct InMemoryBookingRepository {
    bookings: Mutex<HashMap<BookingId, Booking>>,
}

impl InMemoryBookingRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn for_user(&self, user_id: &UserId) -> Result<Vec<Booking>> {
        Ok(lock(&self.bookings)?
            .values()
            .filter(|booking| &booking.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get(&self, id: &BookingId) -> Result<Option<Booking>> {
        Ok(lock(&self.bookings)?.get(id).cloned())
    }

    async fn insert(&self, booking: Booking) -> Result<()> {
        let mut bookings = lock(&self.bookings)?;
        if bookings.contains_key(&booking.id) {
            return Err(BookingError::Repository(format!(
                "booking {} already exists",
                booking.id
            )));
        }
        bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn cancel_if_active(&self, id: &BookingId, now: DateTime<Utc>) -> Result<Option<Booking>> {
        let mut bookings = lock(&self.bookings)?;
        let booking = bookings
            .get_mut(id)
            .ok_or(BookingError::BookingNotFound(*id))?;
        if !booking.is_active() {
            return Ok(None);
        }
        booking.status = BookingStatus::Cancelled;
        booking.updated_at = now;
        Ok(Some(booking.clone()))
    }
}

/// Favorites as an ordered list per user.
#[derive(Debug, Default)]
pub struct InMemoryFavoriteRepository {
    favorites: Mutex<HashMap<UserId, Vec<EventId>>>,
}

impl InMemoryFavoriteRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryFavoriteRepository {
    async fn toggle(&self, user_id: &UserId, event_id: &EventId) -> Result<bool> {
        let mut favorites = lock(&self.favorites)?;
        let list = favorites.entry(user_id.clone()).or_default();
        if let Some(index) = list.iter().position(|id| id == event_id) {
            list.remove(index);
            Ok(false)
        } else {
            list.push(*event_id);
            Ok(true)
        }
    }

    async fn for_user(&self, user_id: &UserId) -> Result<Vec<EventId>> {
        Ok(lock(&self.favorites)?
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn forget_event(&self, event_id: &EventId) -> Result<()> {
        for list in lock(&self.favorites)?.values_mut() {
            list.retain(|id| id != event_id);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use only4kiddos_core::environment::Clock;
    use only4kiddos_core::{ChildId, Money};
    use only4kiddos_testing::test_clock;

    #[tokio::test]
    async fn cancel_if_active_flips_once() {
        let repo = InMemoryBookingRepository::new();
        let now = test_clock().now();
        let booking = Booking::confirmed(
            EventId::new(),
            vec![ChildId::new()],
            UserId::new("parent"),
            Money::from_cents(1_000),
            now,
        );
        let id = booking.id;
        repo.insert(booking).await.unwrap();

        let cancelled = repo.cancel_if_active(&id, now).await.unwrap().unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(repo.cancel_if_active(&id, now).await.unwrap(), None);

        let unknown = BookingId::new();
        assert_eq!(
            repo.cancel_if_active(&unknown, now).await,
            Err(BookingError::BookingNotFound(unknown))
        );
    }

    #[tokio::test]
    async fn toggle_keeps_insertion_order() {
        let repo = InMemoryFavoriteRepository::new();
        let user = UserId::new("parent");
        let (a, b, c) = (EventId::new(), EventId::new(), EventId::new());

        assert!(repo.toggle(&user, &a).await.unwrap());
        assert!(repo.toggle(&user, &b).await.unwrap());
        assert!(repo.toggle(&user, &c).await.unwrap());
        assert!(!repo.toggle(&user, &b).await.unwrap());
        assert_eq!(repo.for_user(&user).await.unwrap(), vec![a, c]);

        repo.forget_event(&a).await.unwrap();
        assert_eq!(repo.for_user(&user).await.unwrap(), vec![c]);
    }
}
