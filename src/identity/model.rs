// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity records as held by the identity store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// Stable numeric identity of a principal. Travels as the token `sub`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(UserId)
    }
}

/// A registered identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    /// Normalized (trimmed, lowercase). Unique.
    pub email: String,
    /// Government document number. Unique.
    pub document_id: String,
    pub password_hash: String,
    /// Ordered; only the first one is embedded in tokens.
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

/// Identity fields before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentity {
    pub name: String,
    pub email: String,
    pub document_id: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

/// The two unique keys of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    Email,
    DocumentId,
}
