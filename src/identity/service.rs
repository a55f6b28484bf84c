// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login.

use std::sync::Arc;

use chrono::Utc;

use super::guard::{RegistrationCandidate, UniquenessGuard};
use super::model::{Identity, NewIdentity, UniqueKey};
use super::password::PasswordHasher;
use super::store::{IdentityStore, StoreError};
use super::validation::{normalize_email, validate_registration, ValidationError};
use crate::auth::issuer::TokenDetails;
use crate::auth::{Role, TokenIssuer};

/// Why a registration was refused.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("email is already registered")]
    DuplicateEmail,

    #[error("document id is already registered")]
    DuplicateDocumentId,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("identity store failed: {0}")]
    Store(String),
}

impl From<StoreError> for RegistrationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(UniqueKey::Email) => RegistrationError::DuplicateEmail,
            StoreError::Duplicate(UniqueKey::DocumentId) => RegistrationError::DuplicateDocumentId,
            StoreError::Unavailable(msg) => RegistrationError::Store(msg),
        }
    }
}

/// Why a login was refused.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// Unknown email or wrong password; callers cannot tell which.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Signing(#[from] crate::auth::error::SigningError),

    #[error("identity store failed: {0}")]
    Store(String),

    #[error("stored password hash is unusable: {0}")]
    Hashing(String),
}

/// Registration fields as received, before validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Registration<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub document_id: Option<&'a str>,
    pub password: Option<&'a str>,
}

/// Account operations of the identity-owning service.
#[derive(Clone)]
pub struct AccountService {
    identities: Arc<dyn IdentityStore>,
    hasher: Arc<dyn PasswordHasher>,
    issuer: Arc<TokenIssuer>,
}

impl AccountService {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        hasher: Arc<dyn PasswordHasher>,
        issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            identities,
            hasher,
            issuer,
        }
    }

    /// Create an identity.
    ///
    /// Steps run in order and stop at the first failure: validation,
    /// uniqueness guard, password hashing, role assignment, insert.
    pub fn register(&self, registration: Registration<'_>) -> Result<Identity, RegistrationError> {
        let valid = validate_registration(
            registration.name,
            registration.email,
            registration.document_id,
            registration.password,
        )?;

        UniquenessGuard::new(self.identities.as_ref()).before_register(RegistrationCandidate {
            email: &valid.email,
            document_id: &valid.document_id,
        })?;

        let password_hash = self
            .hasher
            .hash(&valid.password)
            .map_err(|e| RegistrationError::Hashing(e.to_string()))?;

        let identity = self.identities.insert(NewIdentity {
            name: valid.name,
            email: valid.email,
            document_id: valid.document_id,
            password_hash,
            roles: vec![Role::User],
        })?;

        tracing::info!(user_id = %identity.id, "identity registered");
        Ok(identity)
    }

    /// Check credentials and issue an access token.
    pub fn login(&self, email: &str, password: &str) -> Result<TokenDetails, LoginError> {
        let email = normalize_email(email);
        let identity = self
            .identities
            .find_by_email(&email)
            .map_err(|e| LoginError::Store(e.to_string()))?
            .ok_or_else(|| {
                tracing::info!("login rejected: unknown email");
                LoginError::InvalidCredentials
            })?;

        let matches = self
            .hasher
            .verify(password, &identity.password_hash)
            .map_err(|e| LoginError::Hashing(e.to_string()))?;
        if !matches {
            tracing::info!(user_id = %identity.id, "login rejected: wrong password");
            return Err(LoginError::InvalidCredentials);
        }

        let details = self.issuer.issue(&identity, Utc::now())?;
        tracing::info!(user_id = %identity.id, expires_at = %details.expires_at, "access token issued");
        Ok(details)
    }
}
