// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{extract::State, Json};

use crate::auth::verifier::resolve_email;
use crate::auth::{Auth, AuthError};
use crate::models::MeResponse;
use crate::state::AppState;

/// Get the current authenticated user's information.
///
/// The email comes from the token when embedded, otherwise from the
/// identity store.
pub async fn get_current_user(
    Auth(principal): Auth,
    State(state): State<AppState>,
) -> Result<Json<MeResponse>, AuthError> {
    let email = resolve_email(&principal, state.identities.as_ref())?;

    Ok(Json(MeResponse {
        user_id: principal.subject,
        email,
        role: principal.role,
    }))
}
