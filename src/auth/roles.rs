// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};

/// Platform roles, carried in the token `role` claim and the `X-User-Roles`
/// header in their authority form (`ROLE_ADMIN`, ...).
///
/// ## Role Hierarchy
///
/// - `Admin` - Full access to every service
/// - `Agent` - Manages property listings on behalf of owners
/// - `User` - Regular account; the role every registration receives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    #[serde(rename = "ROLE_AGENT")]
    Agent,
    /// Least privilege; assigned on registration.
    #[default]
    #[serde(rename = "ROLE_USER")]
    User,
}

impl Role {
    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            (Role::Admin, _) => true,
            (Role::Agent, Role::Agent | Role::User) => true,
            (Role::User, Role::User) => true,
            _ => false,
        }
    }

    /// Authority string as it appears on the wire.
    pub fn as_authority(&self) -> &'static str {
        match self {
            Role::Admin => "ROLE_ADMIN",
            Role::Agent => "ROLE_AGENT",
            Role::User => "ROLE_USER",
        }
    }

    /// Parse an authority string (case-insensitive, `ROLE_` prefix optional).
    pub fn from_authority(s: &str) -> Option<Role> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.strip_prefix("ROLE_").unwrap_or(upper.as_str()) {
            "ADMIN" => Some(Role::Admin),
            "AGENT" => Some(Role::Agent),
            "USER" => Some(Role::User),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_authority())
    }
}
