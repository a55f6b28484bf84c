// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the verified principal derived from them.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Claim set carried by every access token.
///
/// The issuer always populates every field. Verification decodes with
/// optional fields so that a missing `exp` or `iss` surfaces as `Expired`
/// or `IssuerMismatch` instead of a generic decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: numeric user id in string form
    pub sub: String,

    /// Issuer URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Issued at (seconds since epoch)
    #[serde(default)]
    pub iat: i64,

    /// Expiration (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// First role of the principal at issuance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Principal email, embedded so verification needs no lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Identity resolved from a token that passed every verification step.
///
/// Placed in request extensions by the edge authenticator and the bearer
/// extractor; the propagation filter reads it from there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPrincipal {
    /// `sub` claim
    pub subject: String,
    /// `email` claim, if embedded
    pub email: Option<String>,
    /// `role` claim, if present
    pub role: Option<String>,
    /// `iss` claim (already checked against configuration)
    pub issuer: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl VerifiedPrincipal {
    pub(crate) fn from_claims(claims: TokenClaims, issuer: String, exp: i64) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email.filter(|e| !e.is_empty()),
            role: claims.role.filter(|r| !r.trim().is_empty()),
            issuer,
            issued_at: seconds_to_datetime(claims.iat),
            expires_at: seconds_to_datetime(exp),
        }
    }
}

fn seconds_to_datetime(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> TokenClaims {
        TokenClaims {
            sub: "42".to_string(),
            iss: Some("http://identity-service".to_string()),
            iat: 1_700_000_000,
            exp: Some(1_700_003_600),
            role: Some("ROLE_AGENT".to_string()),
            email: Some("agent@realty.test".to_string()),
        }
    }

    #[test]
    fn serializes_with_wire_claim_names() {
        let json = serde_json::to_value(sample_claims()).unwrap();
        assert_eq!(json["sub"], "42");
        assert_eq!(json["iss"], "http://identity-service");
        assert_eq!(json["iat"], 1_700_000_000);
        assert_eq!(json["exp"], 1_700_003_600);
        assert_eq!(json["role"], "ROLE_AGENT");
        assert_eq!(json["email"], "agent@realty.test");
    }

    #[test]
    fn absent_role_is_omitted() {
        let mut claims = sample_claims();
        claims.role = None;
        let json = serde_json::to_value(claims).unwrap();
        assert!(json.get("role").is_none());
    }

    #[test]
    fn decodes_without_optional_claims() {
        let claims: TokenClaims = serde_json::from_str(r#"{"sub":"7"}"#).unwrap();
        assert_eq!(claims.sub, "7");
        assert!(claims.exp.is_none());
        assert!(claims.iss.is_none());
    }

    #[test]
    fn principal_drops_blank_role() {
        let mut claims = sample_claims();
        claims.role = Some("  ".to_string());
        let principal =
            VerifiedPrincipal::from_claims(claims, "http://identity-service".to_string(), 1_700_003_600);
        assert_eq!(principal.subject, "42");
        assert!(principal.role.is_none());
        assert_eq!(principal.expires_at.timestamp(), 1_700_003_600);
    }
}
