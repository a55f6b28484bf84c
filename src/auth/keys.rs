// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Symmetric key material for token signing and verification.
//!
//! ## Security
//!
//! - One secret, one algorithm (`HS512`) for the issuer and the edge
//! - Built once at startup, immutable afterwards, shared via `Arc`
//! - Secrets shorter than [`RECOMMENDED_SECRET_BYTES`] are accepted but logged as weak
//! - The secret itself is never logged or exposed through `Debug`

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

use crate::config::ConfigurationError;

/// Signature algorithm used for every token this platform issues or accepts.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS512;

/// Secrets shorter than this are flagged as weak (HS512 block size).
pub const RECOMMENDED_SECRET_BYTES: usize = 128;

/// Signing and verification keys derived from the shared secret.
pub struct KeyMaterial {
    encoding: EncodingKey,
    decoding: DecodingKey,
    secret_len: usize,
}

impl KeyMaterial {
    /// Derive key material from the configured secret.
    ///
    /// Fails with [`ConfigurationError::BlankSecret`] when the secret is empty
    /// or whitespace only; callers treat that as fatal.
    pub fn initialize(secret: &str) -> Result<Self, ConfigurationError> {
        if secret.trim().is_empty() {
            tracing::error!("token key derivation failed: secret is blank");
            return Err(ConfigurationError::BlankSecret);
        }

        let bytes = secret.as_bytes();
        let material = Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            secret_len: bytes.len(),
        };

        if material.is_weak() {
            tracing::warn!(
                secret_len = material.secret_len,
                recommended = RECOMMENDED_SECRET_BYTES,
                "JWT secret is shorter than recommended"
            );
        }
        tracing::info!(
            algorithm = ?TOKEN_ALGORITHM,
            secret_len = material.secret_len,
            "token key material initialized"
        );

        Ok(material)
    }

    pub fn algorithm(&self) -> Algorithm {
        TOKEN_ALGORITHM
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }

    /// Whether the secret is below the recommended length.
    pub fn is_weak(&self) -> bool {
        self.secret_len < RECOMMENDED_SECRET_BYTES
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("algorithm", &TOKEN_ALGORITHM)
            .field("secret_len", &self.secret_len)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_is_fatal() {
        assert_eq!(
            KeyMaterial::initialize("").unwrap_err(),
            ConfigurationError::BlankSecret
        );
    }

    #[test]
    fn whitespace_secret_is_fatal() {
        assert_eq!(
            KeyMaterial::initialize(" \t\n").unwrap_err(),
            ConfigurationError::BlankSecret
        );
    }

    #[test]
    fn short_secret_is_accepted_but_weak() {
        let keys = KeyMaterial::initialize("short-secret").unwrap();
        assert!(keys.is_weak());
        assert_eq!(keys.algorithm(), Algorithm::HS512);
    }

    #[test]
    fn long_secret_is_not_weak() {
        let keys = KeyMaterial::initialize(&"k".repeat(RECOMMENDED_SECRET_BYTES)).unwrap();
        assert!(!keys.is_weak());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let keys = KeyMaterial::initialize("do-not-print-me").unwrap();
        let rendered = format!("{keys:?}");
        assert!(!rendered.contains("do-not-print-me"));
        assert!(rendered.contains("HS512"));
    }
}
