// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Uniqueness guard run before an identity is created.

use super::service::RegistrationError;
use super::store::IdentityStore;

/// The keys a registration candidate must not share with any identity.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationCandidate<'a> {
    pub email: &'a str,
    pub document_id: &'a str,
}

/// Rejects registrations whose email or document id is already taken.
///
/// Email is checked first; the first violation is reported. A store failure
/// fails the registration.
pub struct UniquenessGuard<'a> {
    identities: &'a dyn IdentityStore,
}

impl<'a> UniquenessGuard<'a> {
    pub fn new(identities: &'a dyn IdentityStore) -> Self {
        Self { identities }
    }

    pub fn before_register(&self, candidate: RegistrationCandidate<'_>) -> Result<(), RegistrationError> {
        if self.identities.exists_by_email(candidate.email)? {
            tracing::info!("registration rejected: email already registered");
            return Err(RegistrationError::DuplicateEmail);
        }
        if self.identities.exists_by_document_id(candidate.document_id)? {
            tracing::info!("registration rejected: document id already registered");
            return Err(RegistrationError::DuplicateDocumentId);
        }
        Ok(())
    }
}
