// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for Inkwell.
//!
//! Every component returns its own error enum; each of them can report an
//! [`ErrorKind`] from a closed set so callers branch on the kind rather than
//! on message text.
//!
//! # Error Hierarchy
//!
//! ```text
//! CoreError (root)
//! ├── TokenError        - Credential encoding and verification
//! ├── StoreError        - Key/value store access
//! ├── SessionError      - Session directory operations
//! ├── TransactionError  - Unit-of-work / persistence backend
//! └── AuthError         - Request authentication gate
//! ```
//!
//! # Examples
//!
//! ```
//! use inkwell_core::error::{AuthError, ErrorKind, TokenError};
//!
//! let error = AuthError::InvalidCredential(TokenError::Expired);
//! assert_eq!(error.kind(), ErrorKind::ExpiredToken);
//! assert!(error.kind().is_authentication());
//! ```

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// ErrorKind
// =============================================================================

/// Closed set of error kinds shared by every component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The credential could not be decoded.
    MalformedToken,
    /// The credential signature does not match.
    BadSignature,
    /// The credential validity window has passed.
    ExpiredToken,
    /// The credential validity window has not started yet.
    NotYetValidToken,
    /// The credential is not (or no longer) present in the session directory.
    RevokedOrUnknownToken,
    /// The request carried no credential.
    MissingCredential,
    /// The credential-bearing header has the wrong shape.
    MalformedHeader,
    /// The key/value store could not be reached.
    StoreUnavailable,
    /// A transaction could not be started, committed, or used.
    TransactionFailure,
    /// Misconfiguration or an encoding fault outside the request path.
    Internal,
}

impl ErrorKind {
    /// Returns the stable string code for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedToken => "MALFORMED_TOKEN",
            ErrorKind::BadSignature => "BAD_SIGNATURE",
            ErrorKind::ExpiredToken => "EXPIRED_TOKEN",
            ErrorKind::NotYetValidToken => "NOT_YET_VALID_TOKEN",
            ErrorKind::RevokedOrUnknownToken => "REVOKED_OR_UNKNOWN_TOKEN",
            ErrorKind::MissingCredential => "MISSING_CREDENTIAL",
            ErrorKind::MalformedHeader => "MALFORMED_HEADER",
            ErrorKind::StoreUnavailable => "STORE_UNAVAILABLE",
            ErrorKind::TransactionFailure => "TRANSACTION_FAILURE",
            ErrorKind::Internal => "INTERNAL",
        }
    }

    /// Returns `true` for kinds that describe a failed authentication attempt.
    ///
    /// These are collapsed into a single unauthorized outcome at the HTTP
    /// boundary.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            ErrorKind::MalformedToken
                | ErrorKind::BadSignature
                | ErrorKind::ExpiredToken
                | ErrorKind::NotYetValidToken
                | ErrorKind::RevokedOrUnknownToken
                | ErrorKind::MissingCredential
                | ErrorKind::MalformedHeader
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CoreError - Root Error Type
// =============================================================================

/// The root error type for Inkwell core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Token error.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Key/value store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Session directory error.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// Authentication error.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
}

impl CoreError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Token(e) => e.kind(),
            CoreError::Store(e) => e.kind(),
            CoreError::Session(e) => e.kind(),
            CoreError::Transaction(e) => e.kind(),
            CoreError::Auth(e) => e.kind(),
        }
    }
}

// =============================================================================
// TokenError
// =============================================================================

/// Errors produced while issuing or verifying credentials.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Structural decode failure (segments, base64, JSON, missing claims).
    #[error("Malformed token: {message}")]
    Malformed {
        /// What failed to decode.
        message: String,
    },

    /// Signature verification failed.
    #[error("Token signature is invalid")]
    BadSignature,

    /// The token has expired.
    #[error("Token has expired")]
    Expired,

    /// The token is not valid yet.
    #[error("Token is not valid yet")]
    NotYetValid,

    /// Codec configuration is invalid.
    #[error("Invalid token configuration: {message}")]
    Configuration {
        /// Error message.
        message: String,
    },

    /// Failed to sign a token.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Error message.
        message: String,
    },
}

impl TokenError {
    /// Creates a malformed token error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an encoding error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TokenError::Malformed { .. } => ErrorKind::MalformedToken,
            TokenError::BadSignature => ErrorKind::BadSignature,
            TokenError::Expired => ErrorKind::ExpiredToken,
            TokenError::NotYetValid => ErrorKind::NotYetValidToken,
            TokenError::Configuration { .. } | TokenError::Encoding { .. } => ErrorKind::Internal,
        }
    }
}

// =============================================================================
// StoreError
// =============================================================================

/// Errors reported by a key/value store backend.
///
/// A missing key is never an error: lookups return `Ok(None)`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },

    /// The key holds a value of a different type.
    #[error("Key '{key}' holds a value of the wrong type")]
    WrongType {
        /// The offending key.
        key: String,
    },

    /// The store answered with an error.
    #[error("Store backend error: {message}")]
    Backend {
        /// Error message.
        message: String,
    },
}

impl StoreError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a wrong type error.
    pub fn wrong_type(key: impl Into<String>) -> Self {
        Self::WrongType { key: key.into() }
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Returns `true` if the store could not be reached.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Unavailable { .. } | StoreError::Backend { .. } => {
                ErrorKind::StoreUnavailable
            }
            StoreError::WrongType { .. } => ErrorKind::Internal,
        }
    }
}

// =============================================================================
// SessionError
// =============================================================================

/// Errors produced by the session directory.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No live forward record exists for the token.
    #[error("Session is unknown or has been revoked")]
    Unknown,

    /// The token could not be decoded.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Unknown => ErrorKind::RevokedOrUnknownToken,
            SessionError::Token(e) => e.kind(),
            SessionError::Store(e) => e.kind(),
        }
    }
}

// =============================================================================
// TransactionError
// =============================================================================

/// Errors produced by the unit of work and persistence backends.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// Failed to begin a transaction.
    #[error("Failed to begin transaction: {message}")]
    Begin {
        /// Error message.
        message: String,
    },

    /// Failed to commit a transaction.
    #[error("Failed to commit transaction: {message}")]
    Commit {
        /// Error message.
        message: String,
    },

    /// Failed to roll back a transaction.
    #[error("Failed to roll back transaction: {message}")]
    Rollback {
        /// Error message.
        message: String,
    },

    /// A statement executed inside the transaction failed.
    #[error("Query failed: {message}")]
    Query {
        /// Error message.
        message: String,
    },

    /// Persistence was requested outside of a unit of work.
    #[error("No active transaction in scope")]
    NoActiveTransaction,
}

impl TransactionError {
    /// Creates a begin error.
    pub fn begin(message: impl Into<String>) -> Self {
        Self::Begin {
            message: message.into(),
        }
    }

    /// Creates a commit error.
    pub fn commit(message: impl Into<String>) -> Self {
        Self::Commit {
            message: message.into(),
        }
    }

    /// Creates a rollback error.
    pub fn rollback(message: impl Into<String>) -> Self {
        Self::Rollback {
            message: message.into(),
        }
    }

    /// Creates a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::TransactionFailure
    }
}

// =============================================================================
// AuthError
// =============================================================================

/// Outcome of a rejected authentication attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No credential-bearing header was present.
    #[error("Missing credential")]
    MissingCredential,

    /// The header was not of the form `Bearer <credential>`.
    #[error("Malformed authorization header")]
    MalformedHeader,

    /// The credential failed verification.
    #[error("Invalid credential: {0}")]
    InvalidCredential(#[source] TokenError),

    /// The credential is valid but not live in the session directory.
    #[error("Credential has been revoked or is unknown")]
    RevokedOrUnknown,

    /// The session directory could not be consulted.
    #[error("Session store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),
}

impl AuthError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingCredential => ErrorKind::MissingCredential,
            AuthError::MalformedHeader => ErrorKind::MalformedHeader,
            AuthError::InvalidCredential(e) => e.kind(),
            AuthError::RevokedOrUnknown => ErrorKind::RevokedOrUnknownToken,
            AuthError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_error_kinds() {
        assert_eq!(TokenError::malformed("x").kind(), ErrorKind::MalformedToken);
        assert_eq!(TokenError::BadSignature.kind(), ErrorKind::BadSignature);
        assert_eq!(TokenError::Expired.kind(), ErrorKind::ExpiredToken);
        assert_eq!(TokenError::NotYetValid.kind(), ErrorKind::NotYetValidToken);
        assert_eq!(TokenError::configuration("x").kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_session_error_kinds() {
        assert_eq!(SessionError::Unknown.kind(), ErrorKind::RevokedOrUnknownToken);
        assert_eq!(
            SessionError::from(StoreError::unavailable("down")).kind(),
            ErrorKind::StoreUnavailable
        );
        assert_eq!(
            SessionError::from(TokenError::BadSignature).kind(),
            ErrorKind::BadSignature
        );
    }

    #[test]
    fn test_auth_error_kinds() {
        assert_eq!(AuthError::MissingCredential.kind(), ErrorKind::MissingCredential);
        assert_eq!(AuthError::MalformedHeader.kind(), ErrorKind::MalformedHeader);
        assert_eq!(AuthError::RevokedOrUnknown.kind(), ErrorKind::RevokedOrUnknownToken);
        assert_eq!(
            AuthError::StoreUnavailable(StoreError::unavailable("down")).kind(),
            ErrorKind::StoreUnavailable
        );
        assert!(!ErrorKind::StoreUnavailable.is_authentication());
        assert!(ErrorKind::ExpiredToken.is_authentication());
    }

    #[test]
    fn test_core_error_conversion() {
        let error: CoreError = TransactionError::NoActiveTransaction.into();
        assert_eq!(error.kind(), ErrorKind::TransactionFailure);
        assert_eq!(ErrorKind::TransactionFailure.to_string(), "TRANSACTION_FAILURE");
    }
}
