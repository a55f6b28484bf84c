// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Why a token was rejected. Never retried: a rejected token stays rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("token has expired")]
    Expired,

    #[error("token issuer does not match")]
    IssuerMismatch,

    #[error("token subject does not match any identity")]
    SubjectNotFound,
}

impl TokenError {
    pub fn error_code(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed_token",
            TokenError::SignatureInvalid => "invalid_signature",
            TokenError::Expired => "token_expired",
            TokenError::IssuerMismatch => "invalid_issuer",
            TokenError::SubjectNotFound => "subject_not_found",
        }
    }
}

/// Token could not be signed. Fatal to the issuing request.
#[derive(Debug, thiserror::Error)]
#[error("failed to sign token: {0}")]
pub struct SigningError(pub String);

/// Authentication error type surfaced at the HTTP boundary.
///
/// Every token failure maps to 401; only internal faults produce a 5xx.
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Invalid authorization header format
    InvalidAuthHeader,
    /// Token failed verification
    InvalidToken(TokenError),
    /// Downstream request arrived without gateway identity headers
    MissingIdentityHeaders,
    /// Gateway identity headers present but unreadable
    InvalidIdentityHeaders,
    /// Insufficient permissions
    InsufficientPermissions,
    /// Internal error
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidToken(e) => e.error_code(),
            AuthError::MissingIdentityHeaders => "missing_identity_headers",
            AuthError::InvalidIdentityHeaders => "invalid_identity_headers",
            AuthError::InsufficientPermissions => "insufficient_permissions",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken(_)
            | AuthError::MissingIdentityHeaders
            | AuthError::InvalidIdentityHeaders => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::InvalidToken(e) => write!(f, "Invalid token: {e}"),
            AuthError::MissingIdentityHeaders => write!(f, "Identity headers are required"),
            AuthError::InvalidIdentityHeaders => write!(f, "Identity headers are invalid"),
            AuthError::InsufficientPermissions => {
                write!(f, "Insufficient permissions for this operation")
            }
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        AuthError::InvalidToken(e)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal details stay in the log, not the body.
        let message = match &self {
            AuthError::InternalError(msg) => {
                tracing::error!(error = %msg, "authentication failed internally");
                "Internal authentication error".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(AuthErrorBody {
            error: message,
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_auth_returns_401() {
        let response = AuthError::MissingAuthHeader.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "missing_auth_header");
    }

    #[tokio::test]
    async fn token_errors_are_unauthorized_with_specific_code() {
        for (err, code) in [
            (TokenError::Malformed, "malformed_token"),
            (TokenError::SignatureInvalid, "invalid_signature"),
            (TokenError::Expired, "token_expired"),
            (TokenError::IssuerMismatch, "invalid_issuer"),
            (TokenError::SubjectNotFound, "subject_not_found"),
        ] {
            let response = AuthError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
            assert_eq!(body["error_code"], code);
        }
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let response = AuthError::InternalError("lock poisoned".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert!(!body.contains("lock poisoned"));
    }

    #[tokio::test]
    async fn insufficient_permissions_returns_403() {
        let response = AuthError::InsufficientPermissions.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
