// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the Inkwell binary.
//!
//! | Exit code | Cause                                  |
//! |-----------|----------------------------------------|
//! | 1         | invalid or missing configuration       |
//! | 2         | logger or state could not be set up    |
//! | 3         | the server task failed                 |
//! | 4         | I/O                                    |
//! | 5         | a backend was unreachable at startup   |
//! | 6         | API layer fault                        |
//! | 7         | core fault                             |

use thiserror::Error;

use inkwell_core::{StoreError, TransactionError};

/// Result type alias for inkwell-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can occur in the Inkwell binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Initialization error.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Runtime error.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// The session store could not be reached.
    #[error("Session store unavailable: {0}")]
    SessionStore(#[from] StoreError),

    /// The database could not be reached.
    #[error("Database unavailable: {0}")]
    Database(#[from] TransactionError),

    /// API error.
    #[error("API error: {0}")]
    Api(#[from] inkwell_api::ApiError),

    /// Config parsing error.
    #[error("Config error: {0}")]
    Config(#[from] inkwell_config::ConfigError),

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] inkwell_core::CoreError),
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Creates a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Config(_) => 1,
            Self::Initialization(_) => 2,
            Self::Runtime(_) => 3,
            Self::Io(_) => 4,
            Self::SessionStore(_) | Self::Database(_) => 5,
            Self::Api(_) => 6,
            Self::Core(_) => 7,
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<anyhow::Error> for BinError {
    fn from(err: anyhow::Error) -> Self {
        Self::Runtime(format!("{:#}", err))
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Prints an error and its cause chain to stderr.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

/// Reports an error and exits with the appropriate code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BinError::config("missing secret");
        assert_eq!(err.to_string(), "Configuration error: missing secret");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BinError::config("test").exit_code(), 1);
        assert_eq!(BinError::init("test").exit_code(), 2);
        assert_eq!(BinError::runtime("test").exit_code(), 3);
        assert_eq!(BinError::from(std::io::Error::other("disk")).exit_code(), 4);
        assert_eq!(
            BinError::from(inkwell_config::ConfigError::validation("auth", "empty")).exit_code(),
            1
        );
    }

    #[test]
    fn test_backend_errors_share_exit_code() {
        let store = BinError::from(StoreError::unavailable("connection refused"));
        let database = BinError::from(TransactionError::begin("connection refused"));
        assert_eq!(store.exit_code(), 5);
        assert_eq!(database.exit_code(), 5);
        assert!(store.to_string().starts_with("Session store unavailable"));
    }

    #[test]
    fn test_anyhow_keeps_context() {
        let err = anyhow::anyhow!("salt").context("hashing failed");
        assert_eq!(
            BinError::from(err).to_string(),
            "Runtime error: hashing failed: salt"
        );
    }
}
