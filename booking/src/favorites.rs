//! Favorite events.

use crate::catalog::EventCatalog;
use crate::error::{BookingError, Result};
use crate::repository::FavoriteRepository;
use only4kiddos_core::{AuthContext, EventId, EventView};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Result of a favorite toggle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggle {
    /// Whether the event is a favorite after the toggle
    pub is_favorite: bool,
    /// User-facing confirmation
    pub message: String,
}

/// Per-user favorites.
#[derive(Clone)]
pub struct FavoriteService {
    favorites: Arc<dyn FavoriteRepository>,
    catalog: EventCatalog,
}

impl FavoriteService {
    /// Create the service.
    #[must_use]
    pub fn new(favorites: Arc<dyn FavoriteRepository>, catalog: EventCatalog) -> Self {
        Self { favorites, catalog }
    }

    /// Add or remove an event from the caller's favorites.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::EventNotFound`] for an unknown event.
    #[tracing::instrument(skip_all, fields(%event_id, user_id = %auth.user_id))]
    pub async fn toggle(&self, auth: &AuthContext, event_id: EventId) -> Result<FavoriteToggle> {
        self.catalog.load(event_id).await?;
        let is_favorite = self.favorites.toggle(&auth.user_id, &event_id).await?;
        let message = if is_favorite {
            "Event added to favorites"
        } else {
            "Event removed from favorites"
        };
        Ok(FavoriteToggle {
            is_favorite,
            message: message.to_string(),
        })
    }

    /// The caller's favorite events that still exist, oldest favorite first.
    ///
    /// # Errors
    ///
    /// Returns a repository or ledger failure.
    pub async fn list(&self, auth: &AuthContext) -> Result<Vec<EventView>> {
        let ids = self.favorites.for_user(&auth.user_id).await?;
        let all: HashSet<EventId> = ids.iter().copied().collect();
        let mut views = Vec::with_capacity(ids.len());
        for id in ids {
            match self.catalog.load(id).await {
                Ok(event) => views.extend(self.catalog.view(event, &all).await?),
                Err(BookingError::EventNotFound(_)) => {}
                Err(other) => return Err(other),
            }
        }
        Ok(views)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryEventRepository, InMemoryFavoriteRepository};
    use only4kiddos_ledger::ReservationLedger;
    use only4kiddos_testing::{fixtures, test_clock};

    fn services() -> (EventCatalog, FavoriteService) {
        let favorites: Arc<dyn FavoriteRepository> = Arc::new(InMemoryFavoriteRepository::new());
        let catalog = EventCatalog::new(
            Arc::new(InMemoryEventRepository::new()),
            Arc::clone(&favorites),
            ReservationLedger::in_memory(),
            Arc::new(test_clock()),
        );
        (catalog.clone(), FavoriteService::new(favorites, catalog))
    }

    #[tokio::test]
    async fn toggle_adds_then_removes() {
        let (catalog, favorites) = services();
        let host = fixtures::host();
        let parent = fixtures::parent();
        let event = catalog
            .create(&host, fixtures::new_event("Soccer Skills", 20))
            .await
            .unwrap();
        let id = event.event.id;

        let added = favorites.toggle(&parent, id).await.unwrap();
        assert!(added.is_favorite);
        assert_eq!(added.message, "Event added to favorites");
        assert!(catalog.get(id, Some(&parent)).await.unwrap().is_favorite);
        assert!(!catalog.get(id, None).await.unwrap().is_favorite);

        let listed = favorites.list(&parent).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].is_favorite);

        let removed = favorites.toggle(&parent, id).await.unwrap();
        assert!(!removed.is_favorite);
        assert_eq!(removed.message, "Event removed from favorites");
        assert!(favorites.list(&parent).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_event_cannot_be_favorited() {
        let (_, favorites) = services();
        let id = EventId::new();
        assert_eq!(
            favorites.toggle(&fixtures::parent(), id).await,
            Err(BookingError::EventNotFound(id))
        );
    }

    #[tokio::test]
    async fn deleted_events_drop_out_of_favorites() {
        let (catalog, favorites) = services();
        let host = fixtures::host();
        let parent = fixtures::parent();
        let first = catalog.create(&host, fixtures::new_event("First", 5)).await.unwrap();
        let second = catalog.create(&host, fixtures::new_event("Second", 5)).await.unwrap();
        favorites.toggle(&parent, first.event.id).await.unwrap();
        favorites.toggle(&parent, second.event.id).await.unwrap();

        catalog.delete(&host, first.event.id).await.unwrap();
        let listed = favorites.list(&parent).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].event.id, second.event.id);
    }
}
