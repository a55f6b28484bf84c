// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Public key discovery (`/.well-known/jwks.json`).
//!
//! Tokens are signed with a shared symmetric secret, which must never be
//! published, so the set served here is empty. The endpoint exists so
//! clients that probe for it get a well-formed answer instead of a 404.

use std::sync::Arc;

use axum::{extract::State, Json};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::Algorithm;

use super::keys::KeyMaterial;

/// The key set advertised to verifiers.
#[derive(Debug, Clone)]
pub struct PublicKeySet {
    keys: JwkSet,
}

impl PublicKeySet {
    /// Key set for the given key material. Symmetric keys yield an empty set.
    pub fn for_key_material(keys: &KeyMaterial) -> Self {
        match keys.algorithm() {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                tracing::debug!(algorithm = ?keys.algorithm(), "symmetric signing; publishing no keys");
            }
            other => {
                tracing::warn!(algorithm = ?other, "no public key export for algorithm; publishing no keys");
            }
        }
        Self {
            keys: JwkSet { keys: Vec::new() },
        }
    }

    pub fn jwks(&self) -> &JwkSet {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.keys.is_empty()
    }
}

/// `GET /.well-known/jwks.json`. Never fails.
pub async fn jwks(State(keys): State<Arc<PublicKeySet>>) -> Json<JwkSet> {
    Json(keys.jwks().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_material_publishes_no_keys() {
        let material = KeyMaterial::initialize("jwks-test-secret").unwrap();
        let set = PublicKeySet::for_key_material(&material);
        assert!(set.is_empty());
    }

    #[test]
    fn serializes_as_empty_key_array() {
        let material = KeyMaterial::initialize("jwks-test-secret").unwrap();
        let set = PublicKeySet::for_key_material(&material);
        let json = serde_json::to_value(set.jwks()).unwrap();
        assert_eq!(json, serde_json::json!({ "keys": [] }));
    }
}
