// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::auth::Identity;
use crate::error::ApiError;

// =============================================================================
// Auth Extractor
// =============================================================================

/// Extractor for authenticated requests.
///
/// Extracts the [`Identity`] attached by the auth middleware. Returns 401 if
/// the route was reached without one (a public path).
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Auth(identity): Auth) -> impl IntoResponse {
///     format!("Hello, user {}", identity.subject)
/// }
/// ```
pub struct Auth(pub Identity);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(Auth)
            .ok_or_else(|| ApiError::unauthorized("MISSING_CREDENTIAL"))
    }
}

// =============================================================================
// Optional Auth Extractor
// =============================================================================

/// Extractor for optionally authenticated requests.
pub struct OptionalAuth(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.extensions.get::<Identity>().cloned()))
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// Extractor for JSON payloads.
///
/// Malformed bodies become a 400 in the standard error shape instead of
/// axum's plain-text rejection.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        Ok(ValidatedJson(value))
    }
}

// =============================================================================
// Tests
// =============================================================================
