// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handlers.

use axum::{extract::State, http::StatusCode, Json};

use inkwell_core::database::Database;

use crate::extractors::OptionalAuth;
use crate::response::{ComponentStatus, HealthResponse};
use crate::state::AppState;

/// GET /api/v1/health
///
/// Pings the session store. Returns 503 while it is unreachable, since no
/// authenticated request can succeed then. A caller presenting a live
/// credential is echoed back as `user_id`.
pub async fn health<D: Database>(
    State(state): State<AppState<D>>,
    OptionalAuth(identity): OptionalAuth,
) -> (StatusCode, Json<HealthResponse>) {
    let store = state.sessions.store();
    let store_status = match store.ping().await {
        Ok(()) => ComponentStatus {
            name: format!("session_store:{}", store.name()),
            healthy: true,
            message: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Session store health check failed");
            ComponentStatus {
                name: format!("session_store:{}", store.name()),
                healthy: false,
                message: Some("unreachable".to_string()),
            }
        }
    };

    let mut response = HealthResponse::from_components(vec![store_status]);
    response.user_id = identity.map(|identity| identity.subject);
    let status = if response.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}
