// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for bearer-authenticated principals.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal is VerifiedPrincipal
//! }
//! ```
//!
//! Any state that can hand out an `Arc<TokenVerifier>` (via `FromRef`) works.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, Role, TokenVerifier, VerifiedPrincipal};

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidAuthHeader)?;

    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// Extractor for authenticated principals.
///
/// Uses the principal already placed in request extensions when present,
/// otherwise verifies the bearer token itself.
pub struct Auth(pub VerifiedPrincipal);

impl<S> FromRequestParts<S> for Auth
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<VerifiedPrincipal>().cloned() {
            return Ok(Auth(principal));
        }

        let token = bearer_token(&parts.headers)?;
        let verifier = Arc::<TokenVerifier>::from_ref(state);
        let principal = verifier.verify(token)?;

        parts.extensions.insert(principal.clone());
        Ok(Auth(principal))
    }
}

/// Extractor that requires the admin role.
pub struct AdminOnly(pub VerifiedPrincipal);

impl<S> FromRequestParts<S> for AdminOnly
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(principal) = Auth::from_request_parts(parts, state).await?;

        let is_admin = principal
            .role
            .as_deref()
            .and_then(Role::from_authority)
            .is_some_and(|role| role.has_privilege(Role::Admin));
        if !is_admin {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(principal))
    }
}

/// Optional authentication extractor.
///
/// Returns `None` if no valid authentication is present, instead of rejecting.
pub struct OptionalAuth(pub Option<VerifiedPrincipal>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(principal)) => Ok(OptionalAuth(Some(principal))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}
