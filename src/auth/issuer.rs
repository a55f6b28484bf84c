// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access token issuance.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{encode, Header};
use serde::Serialize;

use super::claims::TokenClaims;
use super::error::SigningError;
use super::keys::KeyMaterial;
use crate::identity::Identity;

/// A freshly signed token and its validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenDetails {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Signs access tokens for authenticated identities.
///
/// Stateless apart from the immutable key material; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: Arc<KeyMaterial>,
    issuer: String,
    lifetime_ms: i64,
}

impl TokenIssuer {
    pub fn new(keys: Arc<KeyMaterial>, issuer: impl Into<String>, lifetime_ms: i64) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            lifetime_ms,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn lifetime_ms(&self) -> i64 {
        self.lifetime_ms
    }

    /// Issue a token for `identity`, valid from `now` for at least the
    /// configured lifetime.
    ///
    /// `exp` travels in whole seconds, so the expiry is rounded up to the next
    /// second and `expires_at` reports that same instant. Only the identity's
    /// first role is embedded; the claim is omitted when the identity has no
    /// roles.
    pub fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<TokenDetails, SigningError> {
        let overflow = || SigningError(format!("lifetime of {}ms overflows", self.lifetime_ms));
        let exp = TimeDelta::try_milliseconds(self.lifetime_ms)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .map(ceil_to_seconds)
            .ok_or_else(overflow)?;
        let expires_at = DateTime::from_timestamp(exp, 0).ok_or_else(overflow)?;

        let claims = TokenClaims {
            sub: identity.id.to_string(),
            iss: Some(self.issuer.clone()),
            iat: now.timestamp(),
            exp: Some(exp),
            role: identity.roles.first().map(|r| r.as_authority().to_string()),
            email: Some(identity.email.clone()),
        };

        let token = encode(
            &Header::new(self.keys.algorithm()),
            &claims,
            self.keys.encoding_key(),
        )
        .map_err(|e| {
            tracing::error!(
                subject = %identity.id,
                algorithm = ?self.keys.algorithm(),
                error = %e,
                "token signing failed"
            );
            SigningError(e.to_string())
        })?;

        tracing::debug!(subject = %identity.id, %expires_at, "access token issued");

        Ok(TokenDetails {
            token,
            issued_at: now,
            expires_at,
        })
    }
}

fn ceil_to_seconds(instant: DateTime<Utc>) -> i64 {
    let millis = instant.timestamp_millis();
    millis.div_euclid(1000) + i64::from(millis.rem_euclid(1000) != 0)
}
