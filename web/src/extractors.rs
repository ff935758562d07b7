//! Custom Axum extractors.
//!
//! - [`CurrentUser`]: a verified caller, or 401
//! - [`MaybeUser`]: a verified caller when a token is present
//! - [`CorrelationId`]: the request's correlation id

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use only4kiddos_core::AuthContext;
use uuid::Uuid;

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// `Ok(None)` when the header is absent.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| {
            AppError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'")
        })?;
    if token.is_empty() {
        return Err(AppError::unauthorized("Empty bearer token"));
    }
    Ok(Some(token))
}

async fn verify(parts: &Parts, state: &AppState) -> Result<Option<AuthContext>, AppError> {
    let Some(token) = bearer_token(&parts.headers)? else {
        return Ok(None);
    };
    let auth = state
        .verifier
        .verify(token)
        .await
        .map_err(|err| AppError::unauthorized(err.to_string()))?;
    Ok(Some(auth))
}

/// Authenticated caller. Rejects with 401 when the token is missing or
/// invalid.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthContext);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        verify(parts, state)
            .await?
            .map(Self)
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}

/// Optional caller for public endpoints that personalize their output.
///
/// A missing header yields `None`; a present but invalid token is still a
/// 401.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthContext>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self(verify(parts, state).await?))
    }
}

/// Correlation id stored by
/// [`correlation_id_layer`](crate::middleware::correlation_id_layer), or a
/// fresh one when the layer is not installed.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .extensions
            .get::<Uuid>()
            .copied()
            .unwrap_or_else(Uuid::new_v4);
        Ok(Self(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers).unwrap(), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), Some("abc"));

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert!(bearer_token(&headers).is_err());
    }
}
