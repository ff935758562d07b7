//! Child profiles.

use crate::authz;
use crate::error::{BookingError, Result};
use crate::repository::ChildRepository;
use only4kiddos_core::environment::Clock;
use only4kiddos_core::{AuthContext, Child, ChildId, ChildPatch, NewChild};
use std::sync::Arc;

/// Manages the children a parent can book for.
#[derive(Clone)]
pub struct ChildService {
    children: Arc<dyn ChildRepository>,
    clock: Arc<dyn Clock>,
}

impl ChildService {
    /// Create the service.
    #[must_use]
    pub fn new(children: Arc<dyn ChildRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { children, clock }
    }

    /// The caller's children sorted by name.
    ///
    /// # Errors
    ///
    /// Returns a repository failure.
    pub async fn list(&self, auth: &AuthContext) -> Result<Vec<Child>> {
        let mut children = self.children.for_parent(&auth.user_id).await?;
        children.sort_by(|a, b| {
            a.details
                .name
                .to_lowercase()
                .cmp(&b.details.name.to_lowercase())
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(children)
    }

    /// Add a child to the caller's account.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed details.
    #[tracing::instrument(skip_all, fields(user_id = %auth.user_id))]
    pub async fn create(&self, auth: &AuthContext, details: NewChild) -> Result<Child> {
        details.validate()?;
        let child = Child::new(details, auth.user_id.clone(), self.clock.now());
        self.children.save(child.clone()).await?;
        tracing::info!(child_id = %child.id, "Child added");
        Ok(child)
    }

    /// Update one of the caller's children.
    ///
    /// # Errors
    ///
    /// - [`BookingError::ChildNotFound`] for an unknown child
    /// - [`BookingError::Forbidden`] if the child belongs to someone else
    /// - a validation error for a malformed patch
    #[tracing::instrument(skip_all, fields(%id, user_id = %auth.user_id))]
    pub async fn update(&self, auth: &AuthContext, id: ChildId, patch: ChildPatch) -> Result<Child> {
        let mut child = self.owned(auth, id, "update this child").await?;
        patch.apply(&mut child)?;
        self.children.save(child.clone()).await?;
        Ok(child)
    }

    /// Delete one of the caller's children.
    ///
    /// # Errors
    ///
    /// - [`BookingError::ChildNotFound`] for an unknown child
    /// - [`BookingError::Forbidden`] if the child belongs to someone else
    #[tracing::instrument(skip_all, fields(%id, user_id = %auth.user_id))]
    pub async fn delete(&self, auth: &AuthContext, id: ChildId) -> Result<()> {
        self.owned(auth, id, "delete this child").await?;
        self.children.delete(&id).await?;
        tracing::info!("Child removed");
        Ok(())
    }

    async fn owned(&self, auth: &AuthContext, id: ChildId, action: &'static str) -> Result<Child> {
        let child = self
            .children
            .get(&id)
            .await?
            .ok_or(BookingError::ChildNotFound(id))?;
        authz::require_owner(auth, &child.parent_id, action)?;
        Ok(child)
    }
}
