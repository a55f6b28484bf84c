// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Edge Gateway
//!
//! Verifies bearer tokens independently of the identity service, rewrites
//! the request with the verified identity headers, and forwards it to the
//! downstream service.
//!
//! Request path: request id, trace span, CORS, [`edge_auth::authenticate`],
//! [`propagation::propagate_identity`], [`proxy::forward`].

pub mod edge_auth;
pub mod propagation;
pub mod proxy;

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use url::Url;

use crate::auth::{KeyMaterial, TokenVerifier};
use crate::config::GatewayConfig;
use crate::telemetry;

/// Timeout for one forwarded request.
const DOWNSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct GatewayState {
    pub verifier: Arc<TokenVerifier>,
    pub client: reqwest::Client,
    pub downstream: Arc<Url>,
}

impl GatewayState {
    pub fn new(verifier: Arc<TokenVerifier>, client: reqwest::Client, downstream: Url) -> Self {
        Self {
            verifier,
            client,
            downstream: Arc::new(downstream),
        }
    }

    /// Build the gateway's own verifier and HTTP client from configuration.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayStartupError> {
        let keys = Arc::new(KeyMaterial::initialize(&config.token.secret)?);
        let verifier = Arc::new(TokenVerifier::new(keys, config.token.issuer.clone()));
        let client = reqwest::Client::builder()
            .timeout(DOWNSTREAM_TIMEOUT)
            .build()
            .map_err(|e| GatewayStartupError::Client(e.to_string()))?;
        Ok(Self::new(verifier, client, config.downstream.clone()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayStartupError {
    #[error(transparent)]
    Configuration(#[from] crate::config::ConfigurationError),

    #[error("failed to build downstream HTTP client: {0}")]
    Client(String),
}

pub fn router(state: GatewayState) -> Router {
    let app = Router::new()
        .fallback(proxy::forward)
        .layer(middleware::from_fn(propagation::propagate_identity))
        .layer(middleware::from_fn_with_state(state.clone(), edge_auth::authenticate))
        .layer(CorsLayer::permissive())
        .with_state(state);

    telemetry::instrument(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Role, TokenIssuer, TrustedIdentity};
    use crate::identity::{Identity, UserId};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        routing::get,
        Json,
    };
    use chrono::{TimeDelta, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const SECRET: &str = "gateway-test-secret-gateway-test-secret-gateway-test";
    const ISSUER: &str = "http://identity-service";

    /// Downstream stand-in that echoes what the gateway told it.
    async fn spawn_downstream() -> Url {
        async fn whoami(identity: TrustedIdentity) -> Json<Value> {
            Json(json!({
                "user_id": identity.user_id,
                "role": identity.role,
            }))
        }

        async fn public(headers: axum::http::HeaderMap) -> Json<Value> {
            Json(json!({ "has_user_id": headers.contains_key("x-user-id") }))
        }

        let app = Router::new()
            .route("/v1/whoami", get(whoami))
            .route("/health", get(public));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}")).unwrap()
    }

    fn state(downstream: Url) -> (GatewayState, TokenIssuer) {
        let keys = Arc::new(KeyMaterial::initialize(SECRET).unwrap());
        let verifier = Arc::new(TokenVerifier::new(keys.clone(), ISSUER));
        let issuer = TokenIssuer::new(keys, ISSUER, 60_000);
        (
            GatewayState::new(verifier, reqwest::Client::new(), downstream),
            issuer,
        )
    }

    fn token(issuer: &TokenIssuer, roles: Vec<Role>) -> String {
        token_at(issuer, roles, Utc::now())
    }

    fn token_at(issuer: &TokenIssuer, roles: Vec<Role>, now: chrono::DateTime<Utc>) -> String {
        let identity = Identity {
            id: UserId(42),
            name: "Eva".to_string(),
            email: "eva@realty.test".to_string(),
            document_id: "55555-1".to_string(),
            password_hash: String::new(),
            roles,
            created_at: now,
        };
        issuer.issue(&identity, now).unwrap().token
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn verified_identity_reaches_downstream() {
        let (state, issuer) = state(spawn_downstream().await);
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/whoami")
                    .header("Authorization", format!("Bearer {}", token(&issuer, vec![Role::Agent])))
                    .header("X-User-Id", "1")
                    .header("X-User-Roles", "ROLE_ADMIN")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user_id"], "42");
        assert_eq!(body["role"], "ROLE_AGENT");
    }

    #[tokio::test]
    async fn protected_path_without_token_is_401() {
        let (state, _) = state(spawn_downstream().await);
        let response = router(state)
            .oneshot(Request::builder().uri("/v1/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error_code"], "missing_auth_header");
    }

    #[tokio::test]
    async fn expired_token_is_401() {
        let (state, issuer) = state(spawn_downstream().await);
        let stale = token_at(&issuer, vec![Role::User], Utc::now() - TimeDelta::hours(1));

        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/v1/whoami")
                    .header("Authorization", format!("Bearer {stale}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error_code"], "token_expired");
    }

    #[tokio::test]
    async fn token_from_other_secret_is_401() {
        let (state, _) = state(spawn_downstream().await);
        let other_keys = Arc::new(KeyMaterial::initialize("some-other-secret-entirely").unwrap());
        let forged = token(&TokenIssuer::new(other_keys, ISSUER, 60_000), vec![Role::Admin]);

        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/v1/whoami")
                    .header("Authorization", format!("Bearer {forged}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error_code"], "invalid_signature");
    }

    #[tokio::test]
    async fn public_path_passes_without_token_and_drops_spoofed_identity() {
        let (state, _) = state(spawn_downstream().await);
        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("X-User-Id", "1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["has_user_id"], false);
    }

    #[tokio::test]
    async fn public_path_with_bad_token_is_401() {
        let (state, _) = state(spawn_downstream().await);
        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("Authorization", "Bearer garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unreachable_downstream_is_502() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (state, issuer) = state(Url::parse(&format!("http://{addr}")).unwrap());
        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/v1/whoami")
                    .header("Authorization", format!("Bearer {}", token(&issuer, vec![Role::User])))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["error_code"], "bad_gateway");
    }
}
