// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the identity service.
//!
//! Request fields are optional at the serde level so a missing field surfaces
//! as a `required` validation error (422) rather than a JSON rejection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::issuer::TokenDetails;
use crate::auth::Role;
use crate::identity::{Identity, Registration};

// =============================================================================
// Registration
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl RegisterRequest {
    pub fn as_registration(&self) -> Registration<'_> {
        Registration {
            name: self.name.as_deref(),
            email: self.email.as_deref(),
            document_id: self.document_id.as_deref(),
            password: self.password.as_deref(),
        }
    }
}

/// A registered identity as returned to clients. Never carries the hash.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

impl From<Identity> for UserResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id.0,
            name: identity.name,
            email: identity.email,
            roles: identity.roles,
            created_at: identity.created_at,
        }
    }
}

// =============================================================================
// Login
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: &'static str,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<TokenDetails> for TokenResponse {
    fn from(details: TokenDetails) -> Self {
        Self {
            access_token: details.token,
            token_type: "Bearer",
            issued_at: details.issued_at,
            expires_at: details.expires_at,
        }
    }
}

// =============================================================================
// Current user
// =============================================================================

/// Response for GET /v1/users/me
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MeResponse {
    /// Token subject
    pub user_id: String,
    pub email: String,
    /// Role claim, if the token carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}
