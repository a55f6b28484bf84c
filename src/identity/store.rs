// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity persistence boundary.
//!
//! The real record store lives in another service; [`IdentityStore`] is the
//! seam the auth core depends on. [`InMemoryIdentityStore`] backs the
//! identity service binary and the tests.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use super::model::{Identity, NewIdentity, UniqueKey, UserId};

/// Error type for identity store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique key is already taken
    Duplicate(UniqueKey),
    /// Store cannot serve the request
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Duplicate(UniqueKey::Email) => write!(f, "Already exists: email"),
            StoreError::Duplicate(UniqueKey::DocumentId) => write!(f, "Already exists: document id"),
            StoreError::Unavailable(msg) => write!(f, "Identity store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

/// Point lookups and inserts over identity records.
pub trait IdentityStore: Send + Sync {
    fn exists_by_email(&self, email: &str) -> StoreResult<bool>;

    fn exists_by_document_id(&self, document_id: &str) -> StoreResult<bool>;

    fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>>;

    fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>>;

    /// Persist a new identity. Must reject a taken email or document id even
    /// when the caller already checked, since checks and insert can interleave.
    fn insert(&self, identity: NewIdentity) -> StoreResult<Identity>;
}

#[derive(Default)]
struct Records {
    next_id: i64,
    by_id: HashMap<UserId, Identity>,
    id_by_email: HashMap<String, UserId>,
    id_by_document: HashMap<String, UserId>,
}

/// Process-local identity store.
#[derive(Default)]
pub struct InMemoryIdentityStore {
    records: RwLock<Records>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Records>> {
        self.records
            .read()
            .map_err(|_| StoreError::Unavailable("identity records lock poisoned".to_string()))
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        Ok(self.read()?.id_by_email.contains_key(email))
    }

    fn exists_by_document_id(&self, document_id: &str) -> StoreResult<bool> {
        Ok(self.read()?.id_by_document.contains_key(document_id))
    }

    fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>> {
        Ok(self.read()?.by_id.get(&id).cloned())
    }

    fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        let records = self.read()?;
        Ok(records
            .id_by_email
            .get(email)
            .and_then(|id| records.by_id.get(id))
            .cloned())
    }

    fn insert(&self, identity: NewIdentity) -> StoreResult<Identity> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Unavailable("identity records lock poisoned".to_string()))?;

        if records.id_by_email.contains_key(&identity.email) {
            return Err(StoreError::Duplicate(UniqueKey::Email));
        }
        if records.id_by_document.contains_key(&identity.document_id) {
            return Err(StoreError::Duplicate(UniqueKey::DocumentId));
        }

        records.next_id += 1;
        let id = UserId(records.next_id);
        let stored = Identity {
            id,
            name: identity.name,
            email: identity.email,
            document_id: identity.document_id,
            password_hash: identity.password_hash,
            roles: identity.roles,
            created_at: Utc::now(),
        };

        records.id_by_email.insert(stored.email.clone(), id);
        records.id_by_document.insert(stored.document_id.clone(), id);
        records.by_id.insert(id, stored.clone());
        Ok(stored)
    }
}
