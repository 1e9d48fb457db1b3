// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # inkwell-config
//!
//! Configuration management for the Inkwell authentication service.
//!
//! ## Features
//!
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Placeholders**: `${VAR}` and `${VAR:default}` resolved before parsing
//! - **Environment Overrides**: `INKWELL_*` variables applied after parsing
//!
//! ## Quick Start
//!
//! ```no_run
//! use inkwell_config::load_config;
//!
//! let config = load_config("inkwell.yaml").unwrap();
//! println!("Session store: {:?}", config.session_store.backend);
//! ```

#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, ConfigFormat, ConfigLoader, EnvLookup};
pub use schema::{
    DatabaseBackend, DatabaseConfig, InkwellConfig, LogFormat, LogLevel, LoggingConfig,
    SeedAccount, SessionStoreConfig, StoreBackend,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
