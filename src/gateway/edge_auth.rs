// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer authentication at the edge.
//!
//! Every request needs a valid `Authorization: Bearer <token>` except the
//! public endpoints in [`PUBLIC_PATHS`], which pass through unauthenticated
//! when they carry no `Authorization` header at all. A verified principal is
//! stored in request extensions for the propagation filter.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::GatewayState;
use crate::auth::extractor::bearer_token;
use crate::auth::trusted::{USER_ID_HEADER, USER_ROLES_HEADER};

/// Paths reachable without a token.
pub const PUBLIC_PATHS: &[&str] = &[
    "/v1/auth/login",
    "/v1/auth/register",
    "/.well-known/jwks.json",
    "/health",
];

/// Whether `path` is one of [`PUBLIC_PATHS`] (or below `/health`).
pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || path.starts_with("/health/")
}

/// Authentication middleware function.
pub async fn authenticate(State(state): State<GatewayState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if is_public(path) && !request.headers().contains_key(AUTHORIZATION) {
        // No principal, so no identity headers may reach downstream.
        let headers = request.headers_mut();
        headers.remove(USER_ID_HEADER);
        headers.remove(USER_ROLES_HEADER);
        return next.run(request).await;
    }

    let token = match bearer_token(request.headers()) {
        Ok(token) => token,
        Err(e) => {
            tracing::debug!(path = %path, error_code = e.error_code(), "edge rejected request");
            return e.into_response();
        }
    };

    match state.verifier.verify(token) {
        Ok(principal) => {
            tracing::debug!(subject = %principal.subject, "edge authenticated request");
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => {
            tracing::info!(path = %request.uri().path(), error_code = e.error_code(), "edge rejected token");
            crate::auth::AuthError::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths() {
        assert!(is_public("/v1/auth/login"));
        assert!(is_public("/v1/auth/register"));
        assert!(is_public("/.well-known/jwks.json"));
        assert!(is_public("/health"));
        assert!(is_public("/health/ready"));
    }

    #[test]
    fn everything_else_is_protected() {
        assert!(!is_public("/v1/users/me"));
        assert!(!is_public("/v1/auth/login/extra"));
        assert!(!is_public("/healthz"));
        assert!(!is_public("/"));
    }
}
