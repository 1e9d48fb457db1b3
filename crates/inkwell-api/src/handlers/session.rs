// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session handlers.

use axum::{extract::State, Json};
use serde::Deserialize;

use inkwell_core::database::Database;
use inkwell_core::unit_of_work::TxScope;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, ValidatedJson};
use crate::response::{LoginResponse, LogoutResponse, ProfileResponse};
use crate::state::AppState;

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// POST /api/v1/login
///
/// Checks the password, issues a credential and registers its session, all
/// inside one unit of work.
pub async fn login<D: Database>(
    State(state): State<AppState<D>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let accounts = state.accounts.clone();
    let codec = state.codec.clone();
    let sessions = state.sessions.clone();

    let response = state
        .unit_of_work
        .run_with_result(&TxScope::new(), |scope| async move {
            let subject = accounts
                .authenticate(&scope, &request.username, &request.password)
                .await?
                .ok_or_else(|| ApiError::unauthorized("INVALID_LOGIN"))?;

            let ttl = sessions.default_ttl();
            let credential = codec.issue(subject)?;
            sessions.register(&credential, subject, ttl).await?;

            Ok::<_, ApiError>(LoginResponse::new(credential, ttl, subject))
        })
        .await?;

    tracing::info!(user_id = %response.user_id, "User logged in");
    Ok(Json(response))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /api/v1/logout
///
/// Revokes the session the request was authenticated with.
pub async fn logout<D: Database>(
    State(state): State<AppState<D>>,
    Auth(identity): Auth,
) -> ApiResult<Json<LogoutResponse>> {
    state.sessions.revoke(&identity.credential).await?;

    tracing::info!(user_id = %identity.subject, "User logged out");
    Ok(Json(LogoutResponse { revoked: 1 }))
}

/// POST /api/v1/logout/all
///
/// Revokes every session of the authenticated user.
pub async fn logout_all<D: Database>(
    State(state): State<AppState<D>>,
    Auth(identity): Auth,
) -> ApiResult<Json<LogoutResponse>> {
    let revoked = state.sessions.revoke_all(identity.subject).await?;

    tracing::info!(user_id = %identity.subject, revoked, "User logged out everywhere");
    Ok(Json(LogoutResponse { revoked }))
}

// =============================================================================
// Profile
// =============================================================================

/// GET /api/v1/profile
///
/// Returns the authenticated user and their number of live sessions.
pub async fn profile<D: Database>(
    State(state): State<AppState<D>>,
    Auth(identity): Auth,
) -> ApiResult<Json<ProfileResponse>> {
    let active = state.sessions.active_sessions(identity.subject).await?;

    Ok(Json(ProfileResponse {
        user_id: identity.subject,
        active_sessions: active.len(),
    }))
}
