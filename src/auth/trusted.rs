// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity propagated by the edge gateway.
//!
//! Services behind the gateway never see or verify a token. They read the
//! `X-User-Id` and `X-User-Roles` headers the gateway wrote after its own
//! verification, and must only be reachable through the gateway.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, Role};

/// Subject of the verified principal.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Role claim of the verified principal. Absent when the token had no role.
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// Identity taken from gateway headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedIdentity {
    pub user_id: String,
    pub role: Option<Role>,
}

impl TrustedIdentity {
    pub fn has_role(&self, required: Role) -> bool {
        self.role.is_some_and(|role| role.has_privilege(required))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for TrustedIdentity {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(AuthError::MissingIdentityHeaders)?
            .to_str()
            .map_err(|_| AuthError::InvalidIdentityHeaders)?
            .trim();
        if user_id.is_empty() {
            return Err(AuthError::MissingIdentityHeaders);
        }

        let role = match parts.headers.get(USER_ROLES_HEADER) {
            None => None,
            Some(value) => {
                let raw = value.to_str().map_err(|_| AuthError::InvalidIdentityHeaders)?;
                match Role::from_authority(raw) {
                    Some(role) => Some(role),
                    None => {
                        tracing::warn!(role = %raw, "unknown role on gateway identity header");
                        return Err(AuthError::InvalidIdentityHeaders);
                    }
                }
            }
        };

        Ok(TrustedIdentity {
            user_id: user_id.to_string(),
            role,
        })
    }
}

/// Like [`TrustedIdentity`] but yields `None` instead of rejecting.
pub struct OptionalTrustedIdentity(pub Option<TrustedIdentity>);

impl<S: Send + Sync> FromRequestParts<S> for OptionalTrustedIdentity {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalTrustedIdentity(
            TrustedIdentity::from_request_parts(parts, state).await.ok(),
        ))
    }
}
