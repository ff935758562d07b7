//! Bearer token verification.
//!
//! The identity provider is external. Handlers only see the
//! [`AuthContext`] an [`IdentityVerifier`] produced from the bearer token.

use async_trait::async_trait;
use only4kiddos_core::{AuthContext, Role, UserId};
use std::collections::HashMap;
use thiserror::Error;

/// Token verification failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The token is unknown, expired or malformed.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// A token table entry could not be parsed.
    #[error("Invalid token entry {entry:?}: expected token=user_id:role:email")]
    InvalidEntry {
        /// The offending entry
        entry: String,
    },
}

/// Turns a bearer token into a verified caller.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify `token`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidToken`] when the token is not accepted.
    async fn verify(&self, token: &str) -> Result<AuthContext, IdentityError>;
}

/// Fixed token table for development and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, AuthContext>,
}

impl StaticTokenVerifier {
    /// An empty table; every token is rejected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as `auth`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, auth: AuthContext) -> Self {
        self.tokens.insert(token.into(), auth);
        self
    }

    /// Parse a table of the form `token=user_id:role:email;...`.
    ///
    /// Blank entries are skipped; unknown roles become plain users.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidEntry`] for an entry without a token,
    /// user id or email.
    ///
    /// # Examples
    ///
    /// ```
    /// use only4kiddos_web::identity::StaticTokenVerifier;
    ///
    /// let verifier = StaticTokenVerifier::parse("dev-host=host-1:host:host@example.com").unwrap();
    /// assert_eq!(verifier.len(), 1);
    /// ```
    pub fn parse(table: &str) -> Result<Self, IdentityError> {
        let mut verifier = Self::new();
        for entry in table.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let invalid = || IdentityError::InvalidEntry {
                entry: entry.to_string(),
            };
            let (token, claims) = entry.split_once('=').ok_or_else(invalid)?;
            let mut parts = claims.splitn(3, ':').map(str::trim);
            let (Some(user_id), Some(role), Some(email)) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(invalid());
            };
            if token.trim().is_empty() || user_id.is_empty() || email.is_empty() {
                return Err(invalid());
            }
            let auth = AuthContext::new(UserId::new(user_id), email, Role::from_claim(role));
            verifier.tokens.insert(token.trim().to_string(), auth);
        }
        Ok(verifier)
    }

    /// Number of accepted tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no token is accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthContext, IdentityError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(IdentityError::InvalidToken)
    }
}
