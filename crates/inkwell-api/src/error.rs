// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Every rejection leaves the server as `{"error": {"code", "message"}}`.
//! Authentication failures of any kind share one code and one message; the
//! kind only reaches the logs.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use inkwell_core::error::{AuthError, SessionError, StoreError, TokenError, TransactionError};

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Unauthorized (401).
    #[error("Unauthorized: {reason}")]
    Unauthorized {
        /// Rejection reason (for logging, never user-facing).
        reason: String,
    },

    /// Service unavailable (503).
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Error message (for logging, not user-facing).
        message: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    /// Creates a service unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns a user-facing error message.
    ///
    /// Never includes the internal cause.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::BadRequest { message } => message.clone(),
            ApiError::Unauthorized { .. } => "Authentication required".to_string(),
            ApiError::ServiceUnavailable { .. } => {
                "Service temporarily unavailable".to_string()
            }
            ApiError::Internal { .. } => "Internal server error".to_string(),
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ApiError::Internal { .. } | ApiError::ServiceUnavailable { .. }
        )
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorResponseBody {
            error: ErrorDetails {
                code: error_code.to_string(),
                message: self.user_message(),
            },
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

// =============================================================================
// From Implementations
// =============================================================================

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::StoreUnavailable(e) => ApiError::service_unavailable(e.to_string()),
            other => ApiError::unauthorized(other.kind().as_str()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Configuration { .. } | TokenError::Encoding { .. } => {
                ApiError::internal(err.to_string())
            }
            other => ApiError::unauthorized(other.kind().as_str()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::WrongType { .. } => ApiError::internal(err.to_string()),
            other => ApiError::service_unavailable(other.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Unknown => ApiError::unauthorized(err.kind().as_str()),
            SessionError::Token(e) => e.into(),
            SessionError::Store(e) => e.into(),
        }
    }
}

impl From<TransactionError> for ApiError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::Begin { .. } => ApiError::service_unavailable(err.to_string()),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::bad_request(format!("Invalid JSON: {}", err))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::bad_request("invalid").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthorized("MISSING_CREDENTIAL").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::service_unavailable("down").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::internal("crash").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_authentication_failures_are_indistinguishable() {
        let errors = [
            ApiError::from(AuthError::MissingCredential),
            ApiError::from(AuthError::MalformedHeader),
            ApiError::from(AuthError::InvalidCredential(TokenError::Expired)),
            ApiError::from(AuthError::InvalidCredential(TokenError::BadSignature)),
            ApiError::from(AuthError::RevokedOrUnknown),
        ];

        for error in &errors {
            assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(error.error_code(), "UNAUTHORIZED");
            assert_eq!(error.user_message(), "Authentication required");
        }
    }

    #[test]
    fn test_store_outage_is_unavailable() {
        let error = ApiError::from(AuthError::StoreUnavailable(StoreError::unavailable("down")));
        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let error = ApiError::from(SessionError::Store(StoreError::unavailable("down")));
        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_transaction_errors() {
        assert_eq!(
            ApiError::from(TransactionError::begin("pool closed")).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(TransactionError::commit("serialization failure")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_sets_challenge_header() {
        let response = ApiError::unauthorized("EXPIRED_TOKEN").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
