//! Caller identity.
//!
//! The identity provider is external; an [`AuthContext`] is what remains of
//! a verified token once it reaches the services.

use crate::ids::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role, carried as a custom claim on the identity token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Parent account
    #[default]
    User,
    /// May publish events
    Host,
    /// Full access
    Admin,
}

impl Role {
    /// Parse a role claim; unknown values fall back to `User`.
    #[must_use]
    pub fn from_claim(claim: &str) -> Self {
        match claim.trim().to_ascii_lowercase().as_str() {
            "host" => Self::Host,
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Host => "host",
            Self::Admin => "admin",
        })
    }
}

/// Verified caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    /// Subject of the identity token
    pub user_id: UserId,
    /// Verified email address
    pub email: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Role claim
    #[serde(default)]
    pub role: Role,
    /// Whether the provider verified the email
    #[serde(default)]
    pub email_verified: bool,
}

impl AuthContext {
    /// Build a context with the given role.
    #[must_use]
    pub fn new(user_id: UserId, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            email: email.into(),
            display_name: None,
            role,
            email_verified: true,
        }
    }

    /// Admins bypass ownership checks.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Hosts and admins may publish events.
    #[must_use]
    pub fn can_host(&self) -> bool {
        matches!(self.role, Role::Host | Role::Admin)
    }

    /// Whether the caller owns a record or is an admin.
    #[must_use]
    pub fn owns_or_admin(&self, owner: &UserId) -> bool {
        &self.user_id == owner || self.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_claims_are_plain_users() {
        assert_eq!(Role::from_claim("HOST"), Role::Host);
        assert_eq!(Role::from_claim("admin"), Role::Admin);
        assert_eq!(Role::from_claim("superuser"), Role::User);
    }

    #[test]
    fn capabilities_follow_roles() {
        let owner = UserId::new("u1");
        let user = AuthContext::new(owner.clone(), "u1@example.com", Role::User);
        let host = AuthContext::new(UserId::new("h1"), "h1@example.com", Role::Host);
        let admin = AuthContext::new(UserId::new("a1"), "a1@example.com", Role::Admin);

        assert!(!user.can_host());
        assert!(host.can_host());
        assert!(admin.can_host());

        assert!(user.owns_or_admin(&owner));
        assert!(!host.owns_or_admin(&owner));
        assert!(admin.owns_or_admin(&owner));
    }
}
