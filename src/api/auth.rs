// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login endpoints.
//!
//! Password hashing is CPU bound, so both handlers run the account
//! operation on the blocking pool.

use axum::{extract::State, http::StatusCode, Json};

use crate::error::ApiError;
use crate::models::{LoginRequest, RegisterRequest, TokenResponse, UserResponse};
use crate::state::AppState;

/// POST /v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let accounts = state.accounts.clone();
    let identity = tokio::task::spawn_blocking(move || accounts.register(request.as_registration()))
        .await
        .map_err(ApiError::internal)??;

    Ok((StatusCode::CREATED, Json(identity.into())))
}

/// POST /v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let accounts = state.accounts.clone();
    let details = tokio::task::spawn_blocking(move || accounts.login(&request.email, &request.password))
        .await
        .map_err(ApiError::internal)??;

    Ok(Json(details.into()))
}
