// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Identity Module
//!
//! Identity records, the store boundary, registration rules, and the account
//! operations (register, login) of the identity-owning service.
//!
//! Registration order: validation, uniqueness guard, password hashing, role
//! assignment, insert. No token is ever issued for an identity that was not
//! persisted.

pub mod guard;
pub mod model;
pub mod password;
pub mod service;
pub mod store;
pub mod validation;

pub use guard::{RegistrationCandidate, UniquenessGuard};
pub use model::{Identity, NewIdentity, UniqueKey, UserId};
pub use password::{Argon2Hasher, PasswordError, PasswordHasher};
pub use service::{AccountService, LoginError, Registration, RegistrationError};
pub use store::{IdentityStore, InMemoryIdentityStore, StoreError, StoreResult};
pub use validation::ValidationError;
