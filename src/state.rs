// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::{KeyMaterial, PublicKeySet, TokenIssuer, TokenVerifier};
use crate::config::{ConfigurationError, IdentityConfig};
use crate::identity::{AccountService, Argon2Hasher, IdentityStore, InMemoryIdentityStore, PasswordHasher};

/// Shared state of the identity service.
///
/// Everything is immutable after construction except the identity store.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub identities: Arc<dyn IdentityStore>,
    pub verifier: Arc<TokenVerifier>,
    pub public_keys: Arc<PublicKeySet>,
}

impl AppState {
    pub fn new(
        keys: Arc<KeyMaterial>,
        issuer: &str,
        token_lifetime_ms: i64,
        identities: Arc<dyn IdentityStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        let token_issuer = Arc::new(TokenIssuer::new(keys.clone(), issuer, token_lifetime_ms));
        let verifier = Arc::new(TokenVerifier::new(keys.clone(), issuer));
        let public_keys = Arc::new(PublicKeySet::for_key_material(&keys));

        Self {
            accounts: AccountService::new(identities.clone(), hasher, token_issuer),
            identities,
            verifier,
            public_keys,
        }
    }

    /// Derive keys and wire the in-memory store and Argon2 hasher.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, ConfigurationError> {
        let keys = Arc::new(KeyMaterial::initialize(&config.token.secret)?);
        Ok(Self::new(
            keys,
            &config.token.issuer,
            config.token_lifetime_ms,
            Arc::new(InMemoryIdentityStore::new()),
            Arc::new(Argon2Hasher::new()),
        ))
    }
}

impl FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

impl FromRef<AppState> for Arc<PublicKeySet> {
    fn from_ref(state: &AppState) -> Self {
        state.public_keys.clone()
    }
}
