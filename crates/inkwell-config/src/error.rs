// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Errors raised while loading or validating an [`InkwellConfig`].
//!
//! [`InkwellConfig`]: crate::InkwellConfig

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file was read but its contents did not parse.
    #[error("Cannot parse '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    /// A value parsed but is not acceptable. `field` is a dotted path such
    /// as `session_store.url`.
    #[error("Invalid '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file does not exist: {path}")]
    FileNotFound { path: PathBuf },

    /// An override variable such as `INKWELL_SERVER_PORT` held garbage.
    #[error("Environment variable '{name}' is invalid: {message}")]
    InvalidEnvVar { name: String, message: String },

    /// The file extension is not one of yaml, yml, toml or json.
    #[error("Unsupported config format: {format}")]
    UnsupportedFormat { format: String },

    /// Deserialization failed before a path was known.
    #[error("Cannot deserialize config: {message}")]
    Serialization { message: String },
}

impl ConfigError {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// The offending field path, for validation failures only.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// `true` when the file itself could not be read.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::FileNotFound { .. })
    }
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
