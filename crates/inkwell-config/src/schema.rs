// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema for Inkwell.
//!
//! ```yaml
//! server:
//!   port: 8080
//!   request_timeout: 30
//! auth:
//!   secret: ${INKWELL_AUTH_SECRET}
//!   validity: 3600
//! session_store:
//!   backend: redis
//!   url: redis://localhost:6379
//! database:
//!   backend: postgres
//!   url: postgres://inkwell@localhost/inkwell
//! logging:
//!   level: info
//!   format: json
//! ```

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use inkwell_api::ApiConfig;
use inkwell_core::token::TokenConfig;
use inkwell_core::types::SubjectId;

use crate::error::{ConfigError, ConfigResult};

/// Default number of PostgreSQL connections.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Default seconds `begin` waits for a PostgreSQL connection.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// Root
// =============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InkwellConfig {
    /// HTTP server settings.
    pub server: ApiConfig,
    /// Credential signing settings.
    pub auth: TokenConfig,
    /// Session store backend.
    pub session_store: SessionStoreConfig,
    /// Transactional database backend.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl InkwellConfig {
    /// Validates the whole configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server
            .validate()
            .map_err(|message| ConfigError::validation("server", message))?;
        self.auth
            .validate()
            .map_err(|e| ConfigError::validation("auth", e.to_string()))?;
        self.session_store.validate()?;
        self.database.validate()?;
        Ok(())
    }
}

// =============================================================================
// Session Store
// =============================================================================

/// Session store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store. Sessions do not survive a restart.
    #[default]
    Memory,
    /// Redis.
    Redis,
}

/// Session store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStoreConfig {
    /// Backend kind.
    pub backend: StoreBackend,
    /// Connection URL, required for Redis.
    pub url: Option<String>,
}

impl SessionStoreConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.backend == StoreBackend::Redis && self.url.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::validation(
                "session_store.url",
                "required for the redis backend",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Database
// =============================================================================

/// Database backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    /// Process-local database seeded from `seed_accounts`.
    #[default]
    Memory,
    /// PostgreSQL.
    Postgres,
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Backend kind.
    pub backend: DatabaseBackend,
    /// Connection URL, required for PostgreSQL.
    pub url: Option<String>,
    /// Number of PostgreSQL connections.
    pub pool_size: usize,
    /// Seconds to wait for a pooled connection before a transaction fails.
    pub connect_timeout_secs: u64,
    /// Accounts loaded into the memory backend at startup.
    pub seed_accounts: Vec<SeedAccount>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Memory,
            url: None,
            pool_size: DEFAULT_POOL_SIZE,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            seed_accounts: Vec::new(),
        }
    }
}

impl DatabaseConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.backend == DatabaseBackend::Postgres {
            if self.url.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigError::validation(
                    "database.url",
                    "required for the postgres backend",
                ));
            }
            if self.pool_size == 0 {
                return Err(ConfigError::validation(
                    "database.pool_size",
                    "must be at least 1",
                ));
            }
            if self.connect_timeout_secs == 0 {
                return Err(ConfigError::validation(
                    "database.connect_timeout_secs",
                    "must be at least 1",
                ));
            }
            if !self.seed_accounts.is_empty() {
                tracing::warn!("database.seed_accounts is ignored by the postgres backend");
            }
        }

        let mut seen = HashSet::new();
        for account in &self.seed_accounts {
            if account.username.trim().is_empty() {
                return Err(ConfigError::validation(
                    "database.seed_accounts",
                    "username must not be empty",
                ));
            }
            if !seen.insert(account.username.as_str()) {
                return Err(ConfigError::validation(
                    "database.seed_accounts",
                    format!("duplicate username '{}'", account.username),
                ));
            }
        }
        Ok(())
    }
}

/// An account loaded into the memory database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedAccount {
    /// Login name.
    pub username: String,
    /// Argon2 PHC string, as printed by `inkwell hash-password`.
    pub password_hash: String,
    /// Subject the account authenticates as.
    pub user_id: SubjectId,
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level.
    pub level: LogLevel,
    /// Log format.
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level as an `EnvFilter` directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON lines for production.
    Json,
    /// Compact single-line text.
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
