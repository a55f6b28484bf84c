// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claims propagation.
//!
//! Turns the verified principal on a request into the plain identity headers
//! downstream services trust. Client-supplied copies of those headers never
//! survive: `X-User-Id` is overwritten, and `X-User-Roles` is overwritten or
//! removed.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::trusted::{USER_ID_HEADER, USER_ROLES_HEADER};
use crate::auth::{AuthError, TokenError, VerifiedPrincipal};

/// Rewrite `request` so it carries `principal`'s identity as headers.
///
/// Without a principal the request is returned unchanged. Applying it twice
/// with the same principal yields the same request.
pub fn propagate_claims<B>(
    mut request: axum::http::Request<B>,
    principal: Option<&VerifiedPrincipal>,
) -> Result<axum::http::Request<B>, AuthError> {
    let Some(principal) = principal else {
        return Ok(request);
    };

    let user_id = header_value(&principal.subject)?;
    let role = principal
        .role
        .as_deref()
        .filter(|role| !role.trim().is_empty())
        .map(header_value)
        .transpose()?;

    let headers = request.headers_mut();
    headers.insert(HeaderName::from_static(USER_ID_HEADER), user_id);
    match role {
        Some(role) => {
            headers.insert(HeaderName::from_static(USER_ROLES_HEADER), role);
        }
        None => {
            headers.remove(USER_ROLES_HEADER);
        }
    }

    Ok(request)
}

fn header_value(value: &str) -> Result<HeaderValue, AuthError> {
    HeaderValue::from_str(value).map_err(|_| {
        tracing::warn!("verified claim cannot be carried as a header value");
        AuthError::InvalidToken(TokenError::Malformed)
    })
}

/// Middleware form of [`propagate_claims`], reading the principal the edge
/// authenticator stored in request extensions.
pub async fn propagate_identity(request: Request, next: Next) -> Response {
    let principal = request.extensions().get::<VerifiedPrincipal>().cloned();
    match propagate_claims(request, principal.as_ref()) {
        Ok(request) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}
