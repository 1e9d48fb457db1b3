// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request authentication gate.
//!
//! ```text
//! Start ──no header──────────────────────────────▶ Rejected(MissingCredential)
//!   │
//!   ▼
//! HeaderExtracted ──not "Bearer <token>"─────────▶ Rejected(MalformedHeader)
//!   │
//!   ▼
//! Verified ──codec error─────────────────────────▶ Rejected(InvalidCredential)
//!   │      ──no record / other owner─────────────▶ Rejected(RevokedOrUnknown)
//!   │      ──store down──────────────────────────▶ Rejected(StoreUnavailable)
//!   ▼
//! Authorized(Identity)
//! ```

use std::sync::Arc;

use axum::http::HeaderValue;
use tracing::warn;

use inkwell_core::error::{AuthError, SessionError};
use inkwell_core::session::SessionDirectory;
use inkwell_core::token::TokenCodec;
use inkwell_core::types::Credential;

use super::Identity;

const BEARER_SCHEME: &str = "Bearer";

// =============================================================================
// AuthGate
// =============================================================================

/// Composes the token codec and the session directory to authenticate
/// requests.
#[derive(Debug, Clone)]
pub struct AuthGate {
    codec: Arc<TokenCodec>,
    sessions: SessionDirectory,
}

impl AuthGate {
    /// Creates a new gate.
    pub fn new(codec: Arc<TokenCodec>, sessions: SessionDirectory) -> Self {
        Self { codec, sessions }
    }

    /// Authenticates the value of an `Authorization` header.
    pub async fn authenticate(&self, header: Option<&HeaderValue>) -> Result<Identity, AuthError> {
        let header = header.ok_or(AuthError::MissingCredential)?;
        let credential = parse_bearer(header)?;

        let claims = self
            .codec
            .verify(&credential)
            .map_err(AuthError::InvalidCredential)?;

        let owner = match self.sessions.validate(&credential).await {
            Ok(owner) => owner,
            Err(SessionError::Unknown) => return Err(AuthError::RevokedOrUnknown),
            Err(SessionError::Store(e)) => return Err(AuthError::StoreUnavailable(e)),
            Err(SessionError::Token(e)) => return Err(AuthError::InvalidCredential(e)),
        };

        if owner != claims.subject {
            warn!(
                claimed = %claims.subject,
                recorded = %owner,
                "Session record belongs to another subject"
            );
            return Err(AuthError::RevokedOrUnknown);
        }

        Ok(Identity::new(claims.subject, credential))
    }
}

/// Extracts the credential from a `Bearer <credential>` header value.
///
/// The scheme is case-sensitive and exactly one space separates it from a
/// non-empty credential without further whitespace.
pub fn parse_bearer(header: &HeaderValue) -> Result<Credential, AuthError> {
    let value = header.to_str().map_err(|_| AuthError::MalformedHeader)?;
    let (scheme, token) = value.split_once(' ').ok_or(AuthError::MalformedHeader)?;

    if scheme != BEARER_SCHEME || token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MalformedHeader);
    }
    Ok(Credential::new(token))
}

// =============================================================================
// Tests
// =============================================================================
