// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use inkwell_core::types::{Credential, SubjectId};

// =============================================================================
// Session Responses
// =============================================================================

/// Response to a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The issued bearer credential.
    pub token: String,
    /// Token type (always "Bearer").
    pub token_type: String,
    /// Lifetime of the credential in seconds.
    pub expires_in: u64,
    /// The authenticated user.
    pub user_id: SubjectId,
}

impl LoginResponse {
    /// Creates a new login response.
    pub fn new(credential: Credential, expires_in: Duration, user_id: SubjectId) -> Self {
        Self {
            token: credential.into_inner(),
            token_type: "Bearer".to_string(),
            expires_in: expires_in.as_secs(),
            user_id,
        }
    }
}

/// Response to a logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Number of sessions revoked.
    pub revoked: usize,
}

/// Profile of the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    /// The authenticated user.
    pub user_id: SubjectId,
    /// Number of live sessions of the user.
    pub active_sessions: usize,
}

// =============================================================================
// Health Response
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status ("healthy" or "unhealthy").
    pub status: String,
    /// Service version.
    pub version: String,
    /// Per-component statuses.
    pub components: Vec<ComponentStatus>,
    /// The caller, when the request carried a live credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<SubjectId>,
}

impl HealthResponse {
    /// Builds a response from component statuses.
    pub fn from_components(components: Vec<ComponentStatus>) -> Self {
        let healthy = components.iter().all(|c| c.healthy);
        Self {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            version: crate::VERSION.to_string(),
            components,
            user_id: None,
        }
    }

    /// Returns `true` if every component is healthy.
    pub fn is_healthy(&self) -> bool {
        self.components.iter().all(|c| c.healthy)
    }
}

/// Status of a single component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// Component name.
    pub name: String,
    /// Whether the component is healthy.
    pub healthy: bool,
    /// Optional status message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
