// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading for Inkwell.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and pick the format from its extension
//! 2. Resolve `${VAR}` and `${VAR:default}` placeholders in the raw text
//! 3. Parse into [`InkwellConfig`]
//! 4. Apply `INKWELL_*` environment overrides
//! 5. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! INKWELL_SERVER_PORT=9090
//! INKWELL_AUTH_SECRET=...
//! INKWELL_REDIS_URL=redis://cache:6379
//! INKWELL_DATABASE_URL=postgres://inkwell@db/inkwell
//! INKWELL_LOG_LEVEL=debug
//! ```
//!
//! Setting a backend URL also selects that backend.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{DatabaseBackend, InkwellConfig, LogLevel, StoreBackend};

/// Looks up an environment variable by name.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader for Inkwell.
///
/// # Examples
///
/// ```no_run
/// use inkwell_config::loader::ConfigLoader;
///
/// let config = ConfigLoader::new().load("inkwell.yaml").unwrap();
/// println!("listening on {}", config.server.socket_addr());
/// ```
#[derive(Clone)]
pub struct ConfigLoader {
    env_prefix: String,
    resolve_env_vars: bool,
    env: EnvLookup,
}

impl ConfigLoader {
    /// Creates a loader reading the process environment.
    pub fn new() -> Self {
        Self {
            env_prefix: "INKWELL".to_string(),
            resolve_env_vars: true,
            env: Arc::new(|name| std::env::var(name).ok()),
        }
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables placeholders and overrides.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Replaces the environment with a custom lookup.
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    /// Loads configuration from a file.
    ///
    /// The file format is determined by the file extension:
    /// - `.yaml` or `.yml` - YAML format
    /// - `.toml` - TOML format
    /// - `.json` - JSON format
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<InkwellConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;

        let config = self.load_from_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<InkwellConfig> {
        let mut config: InkwellConfig = if self.resolve_env_vars {
            parse_str(&self.resolve_env_placeholders(content), format)?
        } else {
            parse_str(content, format)?
        };

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;

        debug!(
            store = ?config.session_store.backend,
            database = ?config.database.backend,
            seed_accounts = config.database.seed_accounts.len(),
            "Configuration validated"
        );
        Ok(config)
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    /// Resolves `${VAR_NAME}` and `${VAR_NAME:default}` placeholders.
    ///
    /// Unknown variables without a default are left in place.
    fn resolve_env_placeholders(&self, content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut rest = content;

        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            let Some(end) = after.find('}') else {
                result.push_str(&rest[start..]);
                return result;
            };

            let placeholder = &after[..end];
            let (name, default) = match placeholder.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (placeholder, None),
            };

            match ((self.env)(name), default) {
                (Some(value), _) => result.push_str(&value),
                (None, Some(default)) => result.push_str(default),
                (None, None) => {
                    warn!("Environment variable '{}' not found", name);
                    result.push_str(&rest[start..start + 2 + end + 1]);
                }
            }
            rest = &after[end + 1..];
        }

        result.push_str(rest);
        result
    }

    fn apply_env_overrides(&self, config: &mut InkwellConfig) -> ConfigResult<()> {
        if let Some(value) = self.var("SERVER_PORT") {
            config.server.port = value.trim().parse().map_err(|_| {
                ConfigError::invalid_env_var(self.var_name("SERVER_PORT"), "expected valid port number")
            })?;
        }

        if let Some(value) = self.var("AUTH_SECRET") {
            config.auth.secret = value;
        }

        if let Some(value) = self.var("REDIS_URL") {
            config.session_store.backend = StoreBackend::Redis;
            config.session_store.url = Some(value);
        }

        if let Some(value) = self.var("DATABASE_URL") {
            config.database.backend = DatabaseBackend::Postgres;
            config.database.url = Some(value);
        }

        if let Some(value) = self.var("LOG_LEVEL") {
            config.logging.level = value
                .parse::<LogLevel>()
                .map_err(|message| ConfigError::invalid_env_var(self.var_name("LOG_LEVEL"), message))?;
        }

        Ok(())
    }

    fn var_name(&self, suffix: &str) -> String {
        format!("{}_{}", self.env_prefix, suffix)
    }

    fn var(&self, suffix: &str) -> Option<String> {
        (self.env)(&self.var_name(suffix))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("env_prefix", &self.env_prefix)
            .field("resolve_env_vars", &self.resolve_env_vars)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> ConfigResult<T> {
    match format {
        ConfigFormat::Yaml => parse_yaml(content),
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

/// YAML goes through the `config` crate.
fn parse_yaml<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::serialization(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<InkwellConfig> {
    ConfigLoader::new().load(path)
}

// =============================================================================
// Tests
// =============================================================================
