// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Token issuance, verification, and identity propagation across services.
//!
//! ## Auth Flow
//!
//! 1. Client logs in against the identity service with email and password
//! 2. Identity service issues an HS512-signed token (`sub`, `iss`, `iat`, `exp`, `role`, `email`)
//! 3. Client sends `Authorization: Bearer <token>`
//! 4. Edge gateway:
//!    - Verifies signature, expiry, issuer with its own verifier
//!    - Writes `X-User-Id` / `X-User-Roles` on the forwarded request
//! 5. Downstream services read those headers with [`TrustedIdentity`]
//!
//! ## Security
//!
//! - One shared secret, one algorithm; anything else is rejected
//! - Expiry is strict: a token is expired at its `exp` instant, no leeway
//! - The secret and raw tokens are never logged

pub mod claims;
pub mod error;
pub mod extractor;
pub mod issuer;
pub mod jwks;
pub mod keys;
pub mod roles;
pub mod trusted;
pub mod verifier;

pub use claims::{TokenClaims, VerifiedPrincipal};
pub use error::{AuthError, SigningError, TokenError};
pub use extractor::{AdminOnly, Auth, OptionalAuth};
pub use issuer::{TokenDetails, TokenIssuer};
pub use jwks::PublicKeySet;
pub use keys::KeyMaterial;
pub use roles::Role;
pub use trusted::{OptionalTrustedIdentity, TrustedIdentity};
pub use verifier::TokenVerifier;
