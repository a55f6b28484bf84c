// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Forwarding to the downstream service.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, uri::PathAndQuery, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use url::Url;

use super::GatewayState;

/// Largest request body the gateway buffers and forwards.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug)]
pub enum ProxyError {
    /// Request body over [`MAX_BODY_BYTES`] or unreadable
    PayloadTooLarge,
    /// Target URL could not be built
    InvalidTarget(String),
    /// Downstream unreachable or its response unreadable
    BadGateway(String),
}

#[derive(Serialize)]
struct ProxyErrorBody {
    error: String,
    error_code: &'static str,
}

impl ProxyError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ProxyError::PayloadTooLarge => "payload_too_large",
            ProxyError::InvalidTarget(_) => "invalid_target",
            ProxyError::BadGateway(_) => "bad_gateway",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            ProxyError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl std::fmt::Display for ProxyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProxyError::PayloadTooLarge => write!(f, "Request body exceeds {MAX_BODY_BYTES} bytes"),
            ProxyError::InvalidTarget(_) => write!(f, "Request target cannot be forwarded"),
            ProxyError::BadGateway(_) => write!(f, "Downstream service unavailable"),
        }
    }
}

impl std::error::Error for ProxyError {}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match &self {
            ProxyError::InvalidTarget(detail) | ProxyError::BadGateway(detail) => {
                tracing::warn!(error_code = self.error_code(), detail = %detail, "forwarding failed");
            }
            ProxyError::PayloadTooLarge => {}
        }
        let body = Json(ProxyErrorBody {
            error: self.to_string(),
            error_code: self.error_code(),
        });
        (self.status_code(), body).into_response()
    }
}

/// Fallback handler: relay the request downstream and the response back.
pub async fn forward(State(state): State<GatewayState>, request: Request) -> Response {
    match forward_request(&state, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn forward_request(state: &GatewayState, request: Request) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let target = downstream_url(&state.downstream, parts.uri.path_and_query())?;

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| ProxyError::PayloadTooLarge)?;

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);

    tracing::debug!(method = %parts.method, target = %target, "forwarding request");

    let upstream = state
        .client
        .request(parts.method, target)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| ProxyError::BadGateway(e.to_string()))?;

    let status = upstream.status();
    let mut response_headers = upstream.headers().clone();
    strip_hop_by_hop(&mut response_headers);
    response_headers.remove(header::CONTENT_LENGTH);

    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| ProxyError::BadGateway(e.to_string()))?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    Ok(response)
}

/// `base` with the request's path and query appended. A path prefix on
/// `base` is kept.
pub fn downstream_url(base: &Url, path_and_query: Option<&PathAndQuery>) -> Result<Url, ProxyError> {
    let suffix = path_and_query.map(PathAndQuery::as_str).unwrap_or("/");
    let joined = format!("{}{}", base.as_str().trim_end_matches('/'), suffix);
    Url::parse(&joined).map_err(|e| ProxyError::InvalidTarget(e.to_string()))
}

/// Remove connection-scoped headers, including any the `Connection` header names.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in named {
        headers.remove(name);
    }
    for name in [
        header::CONNECTION,
        header::PROXY_AUTHENTICATE,
        header::PROXY_AUTHORIZATION,
        header::TE,
        header::TRAILER,
        header::TRANSFER_ENCODING,
        header::UPGRADE,
    ] {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}
