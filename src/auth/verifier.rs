// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access token verification.
//!
//! ## Check Order
//!
//! 1. Structure (header decodes) → `Malformed`
//! 2. Signature against the verification key, algorithm pinned → `SignatureInvalid`
//! 3. Claim set decodes → `Malformed`
//! 4. `exp` present and strictly after now → `Expired`
//! 5. `iss` equals the configured issuer → `IssuerMismatch`
//!
//! The first failing step wins. No leeway is applied to `exp`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Header, Validation};

use super::claims::{TokenClaims, VerifiedPrincipal};
use super::error::TokenError;
use super::keys::KeyMaterial;
use crate::identity::{IdentityStore, UserId};

/// Verifies tokens signed with the shared key material.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keys: Arc<KeyMaterial>,
    issuer: String,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(keys: Arc<KeyMaterial>, issuer: impl Into<String>) -> Self {
        // jsonwebtoken only checks the signature here; time and issuer checks
        // run afterwards in the fixed order above.
        let mut validation = Validation::new(keys.algorithm());
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        Self {
            keys,
            issuer: issuer.into(),
            validation,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Verify `token` against the current time.
    pub fn verify(&self, token: &str) -> Result<VerifiedPrincipal, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as of `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedPrincipal, TokenError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "token header could not be decoded");
            TokenError::Malformed
        })?;

        let claims = decode::<TokenClaims>(token, self.keys.decoding_key(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| self.classify(e.kind(), &header))?;

        let exp = match claims.exp {
            Some(exp) if exp.saturating_mul(1000) > now.timestamp_millis() => exp,
            Some(exp) => {
                tracing::debug!(subject = %claims.sub, exp, "token expired");
                return Err(TokenError::Expired);
            }
            None => {
                tracing::debug!(subject = %claims.sub, "token carries no exp claim");
                return Err(TokenError::Expired);
            }
        };

        let issuer = match claims.iss.as_deref() {
            Some(iss) if iss == self.issuer => iss.to_string(),
            actual => {
                tracing::warn!(
                    expected = %self.issuer,
                    actual = actual.unwrap_or("<none>"),
                    "token issuer mismatch"
                );
                return Err(TokenError::IssuerMismatch);
            }
        };

        Ok(VerifiedPrincipal::from_claims(claims, issuer, exp))
    }

    /// Boolean form used by request-authorization checks.
    ///
    /// Absent, empty, or whitespace-only input is invalid without attempting
    /// to decode it.
    pub fn is_valid(&self, token: Option<&str>) -> bool {
        match token {
            Some(t) if !t.trim().is_empty() => self.verify(t).is_ok(),
            _ => false,
        }
    }

    /// Verify `token` and resolve the principal's email.
    pub fn extract_principal_email(
        &self,
        token: &str,
        identities: &dyn IdentityStore,
    ) -> Result<String, TokenError> {
        let principal = self.verify(token)?;
        resolve_email(&principal, identities)
    }

    fn classify(&self, kind: &ErrorKind, header: &Header) -> TokenError {
        match kind {
            ErrorKind::InvalidSignature => {
                tracing::debug!("token signature mismatch");
                TokenError::SignatureInvalid
            }
            ErrorKind::InvalidAlgorithm => {
                tracing::warn!(
                    expected = ?self.keys.algorithm(),
                    actual = ?header.alg,
                    "token signed with unexpected algorithm"
                );
                TokenError::SignatureInvalid
            }
            other => {
                tracing::debug!(error = ?other, "token could not be decoded");
                TokenError::Malformed
            }
        }
    }
}

/// Email of an already verified principal: the embedded claim when present,
/// otherwise a lookup of the subject in the identity store.
pub fn resolve_email(
    principal: &VerifiedPrincipal,
    identities: &dyn IdentityStore,
) -> Result<String, TokenError> {
    if let Some(email) = &principal.email {
        return Ok(email.clone());
    }

    let id: UserId = principal.subject.parse().map_err(|_| {
        tracing::debug!(subject = %principal.subject, "token subject is not a user id");
        TokenError::SubjectNotFound
    })?;

    match identities.find_by_id(id) {
        Ok(Some(identity)) => Ok(identity.email),
        Ok(None) => {
            tracing::debug!(subject = %id, "token subject has no identity");
            Err(TokenError::SubjectNotFound)
        }
        Err(e) => {
            tracing::warn!(subject = %id, error = %e, "identity lookup failed during verification");
            Err(TokenError::SubjectNotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Role, TokenIssuer};
    use crate::identity::{Identity, InMemoryIdentityStore, NewIdentity};
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use chrono::TimeZone;
    use jsonwebtoken::{encode, Algorithm, EncodingKey};

    const SECRET: &str = "verifier-test-secret";
    const ISSUER: &str = "http://identity-service";

    fn keys() -> Arc<KeyMaterial> {
        Arc::new(KeyMaterial::initialize(SECRET).unwrap())
    }

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(keys(), ISSUER)
    }

    fn identity() -> Identity {
        Identity {
            id: UserId(42),
            name: "Ana Souza".to_string(),
            email: "ana@realty.test".to_string(),
            document_id: "12345678901".to_string(),
            password_hash: "hash".to_string(),
            roles: vec![Role::User],
            created_at: Utc::now(),
        }
    }

    fn sign(claims: &impl serde::Serialize, alg: Algorithm) -> String {
        encode(
            &jsonwebtoken::Header::new(alg),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn claims_expiring_at(exp: i64) -> TokenClaims {
        TokenClaims {
            sub: "42".to_string(),
            iss: Some(ISSUER.to_string()),
            iat: exp - 60,
            exp: Some(exp),
            role: Some("ROLE_USER".to_string()),
            email: Some("ana@realty.test".to_string()),
        }
    }

    fn at_millis(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn flip_bit(token: &str, segment: usize, bit: usize) -> String {
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let mut bytes = URL_SAFE_NO_PAD.decode(&parts[segment]).unwrap();
        bytes[bit / 8] ^= 1 << (bit % 8);
        parts[segment] = URL_SAFE_NO_PAD.encode(bytes);
        parts.join(".")
    }

    #[test]
    fn round_trip_resolves_subject_and_email() {
        let issuer = TokenIssuer::new(keys(), ISSUER, 60_000);
        let details = issuer.issue(&identity(), Utc::now()).unwrap();

        let principal = verifier().verify(&details.token).unwrap();
        assert_eq!(principal.subject, "42");
        assert_eq!(principal.email.as_deref(), Some("ana@realty.test"));
        assert_eq!(principal.role.as_deref(), Some("ROLE_USER"));
        assert_eq!(principal.issuer, ISSUER);
    }

    #[test]
    fn exp_equal_to_now_is_expired() {
        let exp = 1_800_000_000;
        let token = sign(&claims_expiring_at(exp), Algorithm::HS512);
        let result = verifier().verify_at(&token, at_millis(exp * 1000));
        assert_eq!(result.unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn exp_one_millisecond_ahead_is_valid() {
        let exp = 1_800_000_000;
        let token = sign(&claims_expiring_at(exp), Algorithm::HS512);
        assert!(verifier().verify_at(&token, at_millis(exp * 1000 - 1)).is_ok());
    }

    #[test]
    fn missing_exp_is_expired() {
        let mut claims = claims_expiring_at(1_800_000_000);
        claims.exp = None;
        let token = sign(&claims, Algorithm::HS512);
        assert_eq!(verifier().verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn issued_token_expires_after_lifetime() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();
        let details = TokenIssuer::new(keys(), ISSUER, 5_000)
            .issue(&identity(), now)
            .unwrap();

        let v = verifier();
        assert!(v.verify_at(&details.token, now).is_ok());
        assert_eq!(
            v.verify_at(&details.token, details.expires_at).unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let other = TokenIssuer::new(keys(), "http://someone-else", 60_000);
        let details = other.issue(&identity(), Utc::now()).unwrap();
        assert_eq!(
            verifier().verify(&details.token).unwrap_err(),
            TokenError::IssuerMismatch
        );
    }

    #[test]
    fn missing_issuer_is_rejected() {
        let mut claims = claims_expiring_at(Utc::now().timestamp() + 600);
        claims.iss = None;
        let token = sign(&claims, Algorithm::HS512);
        assert_eq!(verifier().verify(&token).unwrap_err(), TokenError::IssuerMismatch);
    }

    #[test]
    fn expiry_is_checked_before_issuer() {
        let mut claims = claims_expiring_at(1_000);
        claims.iss = Some("http://someone-else".to_string());
        let token = sign(&claims, Algorithm::HS512);
        assert_eq!(verifier().verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn any_bit_flip_in_signature_is_detected() {
        let details = TokenIssuer::new(keys(), ISSUER, 60_000)
            .issue(&identity(), Utc::now())
            .unwrap();
        let signature_bits = URL_SAFE_NO_PAD
            .decode(details.token.split('.').nth(2).unwrap())
            .unwrap()
            .len()
            * 8;

        let v = verifier();
        for bit in 0..signature_bits {
            let tampered = flip_bit(&details.token, 2, bit);
            assert_eq!(
                v.verify(&tampered).unwrap_err(),
                TokenError::SignatureInvalid,
                "bit {bit}"
            );
        }
    }

    #[test]
    fn any_bit_flip_in_claims_is_detected() {
        let details = TokenIssuer::new(keys(), ISSUER, 60_000)
            .issue(&identity(), Utc::now())
            .unwrap();
        let claim_bits = URL_SAFE_NO_PAD
            .decode(details.token.split('.').nth(1).unwrap())
            .unwrap()
            .len()
            * 8;

        let v = verifier();
        for bit in 0..claim_bits {
            let tampered = flip_bit(&details.token, 1, bit);
            assert_eq!(
                v.verify(&tampered).unwrap_err(),
                TokenError::SignatureInvalid,
                "bit {bit}"
            );
        }
    }

    #[test]
    fn other_secret_is_signature_invalid() {
        let other_keys = Arc::new(KeyMaterial::initialize("a-different-secret").unwrap());
        let details = TokenIssuer::new(other_keys, ISSUER, 60_000)
            .issue(&identity(), Utc::now())
            .unwrap();
        assert_eq!(
            verifier().verify(&details.token).unwrap_err(),
            TokenError::SignatureInvalid
        );
    }

    #[test]
    fn hs256_token_is_rejected() {
        let token = sign(
            &claims_expiring_at(Utc::now().timestamp() + 600),
            Algorithm::HS256,
        );
        assert_eq!(verifier().verify(&token).unwrap_err(), TokenError::SignatureInvalid);
    }

    #[test]
    fn garbage_is_malformed() {
        let v = verifier();
        assert_eq!(v.verify("").unwrap_err(), TokenError::Malformed);
        assert_eq!(v.verify("not-a-token").unwrap_err(), TokenError::Malformed);
        assert_eq!(v.verify("a.b.c").unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn signed_but_undecodable_claims_are_malformed() {
        let token = sign(
            &serde_json::json!({ "iss": ISSUER, "exp": Utc::now().timestamp() + 600 }),
            Algorithm::HS512,
        );
        assert_eq!(verifier().verify(&token).unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn blank_tokens_are_invalid() {
        let v = verifier();
        assert!(!v.is_valid(Some("")));
        assert!(!v.is_valid(Some("   ")));
        assert!(!v.is_valid(None));
    }

    #[test]
    fn is_valid_accepts_fresh_token() {
        let details = TokenIssuer::new(keys(), ISSUER, 60_000)
            .issue(&identity(), Utc::now())
            .unwrap();
        assert!(verifier().is_valid(Some(&details.token)));
        assert!(!verifier().is_valid(Some("junk")));
    }

    #[test]
    fn email_is_taken_from_claim() {
        let store = InMemoryIdentityStore::new();
        let details = TokenIssuer::new(keys(), ISSUER, 60_000)
            .issue(&identity(), Utc::now())
            .unwrap();
        let email = verifier()
            .extract_principal_email(&details.token, &store)
            .unwrap();
        assert_eq!(email, "ana@realty.test");
    }

    #[test]
    fn email_falls_back_to_subject_lookup() {
        let store = InMemoryIdentityStore::new();
        let stored = store
            .insert(NewIdentity {
                name: "Bruno Lima".to_string(),
                email: "bruno@realty.test".to_string(),
                document_id: "98765432100".to_string(),
                password_hash: "hash".to_string(),
                roles: vec![Role::User],
            })
            .unwrap();

        let mut claims = claims_expiring_at(Utc::now().timestamp() + 600);
        claims.sub = stored.id.to_string();
        claims.email = None;
        let token = sign(&claims, Algorithm::HS512);

        let email = verifier().extract_principal_email(&token, &store).unwrap();
        assert_eq!(email, "bruno@realty.test");
    }

    #[test]
    fn unknown_subject_is_not_found() {
        let store = InMemoryIdentityStore::new();
        let mut claims = claims_expiring_at(Utc::now().timestamp() + 600);
        claims.sub = "999".to_string();
        claims.email = None;
        let token = sign(&claims, Algorithm::HS512);

        assert_eq!(
            verifier().extract_principal_email(&token, &store).unwrap_err(),
            TokenError::SubjectNotFound
        );
    }

    #[test]
    fn verification_failure_precedes_lookup() {
        let store = InMemoryIdentityStore::new();
        assert_eq!(
            verifier().extract_principal_email("a.b.c", &store).unwrap_err(),
            TokenError::Malformed
        );
    }
}
