// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Configuration Integration Tests
//!
//! Integration tests for loading configuration files:
//!
//! - YAML, TOML and JSON files
//! - `${VAR}` placeholders and `INKWELL_*` overrides
//! - Validation failures
//! - Driving the application from a loaded file
//!
//! ## Test Categories
//!
//! - `test_load_*`: File loading tests
//! - `test_env_*`: Environment tests
//! - `test_invalid_*`: Validation tests
//! - `test_config_drives_*`: End-to-end tests

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use inkwell_config::{
    ConfigError, ConfigLoader, DatabaseBackend, LogFormat, LogLevel, StoreBackend,
};
use inkwell_core::token::TokenCodec;
use inkwell_tests::prelude::*;

// =============================================================================
// Test Helpers
// =============================================================================

const YAML: &str = r#"
server:
  port: 9000
  request_timeout: 10
auth:
  secret: ${BLOG_SECRET}
  validity: 1800
session_store:
  backend: redis
  url: ${REDIS_HOST:redis://localhost:6379}
logging:
  level: debug
  format: json
"#;

fn write_config(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write config");
    (dir, path)
}

fn loader_with(vars: &[(&str, &str)]) -> ConfigLoader {
    let env: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ConfigLoader::new().with_env_lookup(move |name| env.get(name).cloned())
}

// =============================================================================
// File Loading Tests
// =============================================================================

#[test]
fn test_load_yaml_with_placeholders() {
    let (_dir, path) = write_config("inkwell.yaml", YAML);

    let config = loader_with(&[("BLOG_SECRET", TEST_SECRET)])
        .load(&path)
        .unwrap();

    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.request_timeout, Duration::from_secs(10));
    assert_eq!(config.server.base_path, "/api/v1");
    assert_eq!(config.auth.secret, TEST_SECRET);
    assert_eq!(config.auth.validity, Duration::from_secs(1800));
    assert_eq!(config.session_store.backend, StoreBackend::Redis);
    assert_eq!(
        config.session_store.url.as_deref(),
        Some("redis://localhost:6379")
    );
    assert_eq!(config.database.backend, DatabaseBackend::Memory);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_load_toml() {
    let content = format!(
        r#"
[server]
port = 8181

[auth]
secret = "{}"

[database]
backend = "postgres"
url = "postgres://inkwell@localhost/inkwell"
pool_size = 8
"#,
        TEST_SECRET
    );
    let (_dir, path) = write_config("inkwell.toml", &content);

    let config = loader_with(&[]).load(&path).unwrap();
    assert_eq!(config.server.port, 8181);
    assert_eq!(config.database.backend, DatabaseBackend::Postgres);
    assert_eq!(config.database.pool_size, 8);
    assert_eq!(config.auth.validity, Duration::from_secs(3600));
}

#[test]
fn test_load_json() {
    let content = serde_json::json!({
        "auth": { "secret": TEST_SECRET },
        "logging": { "level": "warn", "format": "compact" }
    })
    .to_string();
    let (_dir, path) = write_config("inkwell.json", &content);

    let config = loader_with(&[]).load(&path).unwrap();
    assert_eq!(config.logging.level, LogLevel::Warn);
    assert_eq!(config.logging.format, LogFormat::Compact);
    assert_eq!(config.session_store.backend, StoreBackend::Memory);
}

#[test]
fn test_load_missing_file() {
    let err = loader_with(&[])
        .load("/nonexistent/inkwell.yaml")
        .unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
    assert!(err.is_io());
}

#[test]
fn test_load_unsupported_extension() {
    let (_dir, path) = write_config("inkwell.ini", "[server]\nport = 1\n");
    let err = loader_with(&[]).load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
}

// =============================================================================
// Environment Tests
// =============================================================================

#[test]
fn test_env_overrides_win_over_file() {
    let (_dir, path) = write_config("inkwell.yaml", YAML);

    let config = loader_with(&[
        ("BLOG_SECRET", TEST_SECRET),
        ("INKWELL_SERVER_PORT", "7070"),
        ("INKWELL_DATABASE_URL", "postgres://db/inkwell"),
        ("INKWELL_LOG_LEVEL", "warning"),
    ])
    .load(&path)
    .unwrap();

    assert_eq!(config.server.port, 7070);
    assert_eq!(config.database.backend, DatabaseBackend::Postgres);
    assert_eq!(config.database.url.as_deref(), Some("postgres://db/inkwell"));
    assert_eq!(config.logging.level, LogLevel::Warn);
}

#[test]
fn test_env_secret_override_satisfies_validation() {
    let (_dir, path) = write_config("inkwell.yaml", "server:\n  port: 8080\n");

    assert!(loader_with(&[]).load(&path).is_err());

    let config = loader_with(&[("INKWELL_AUTH_SECRET", OTHER_SECRET)])
        .load(&path)
        .unwrap();
    assert_eq!(config.auth.secret, OTHER_SECRET);
}

#[test]
fn test_env_invalid_port() {
    let (_dir, path) = write_config("inkwell.yaml", YAML);

    let err = loader_with(&[("BLOG_SECRET", TEST_SECRET), ("INKWELL_SERVER_PORT", "eighty")])
        .load(&path)
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { .. }));
}

#[test]
fn test_env_custom_prefix() {
    let (_dir, path) = write_config("inkwell.yaml", YAML);

    let config = loader_with(&[("BLOG_SECRET", TEST_SECRET), ("BLOG_SERVER_PORT", "6060")])
        .with_env_prefix("BLOG")
        .load(&path)
        .unwrap();
    assert_eq!(config.server.port, 6060);
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_invalid_missing_secret() {
    let (_dir, path) = write_config("inkwell.yaml", "logging:\n  level: info\n");

    let err = loader_with(&[]).load(&path).unwrap_err();
    assert_eq!(err.field(), Some("auth"));
}

#[test]
fn test_invalid_redis_without_url() {
    let content = format!(
        "auth:\n  secret: {}\nsession_store:\n  backend: redis\n",
        TEST_SECRET
    );
    let (_dir, path) = write_config("inkwell.yaml", &content);

    let err = loader_with(&[]).load(&path).unwrap_err();
    assert_eq!(err.field(), Some("session_store.url"));
}

#[test]
fn test_invalid_base_path() {
    let content = format!(
        "server:\n  base_path: /api/v1/\nauth:\n  secret: {}\n",
        TEST_SECRET
    );
    let (_dir, path) = write_config("inkwell.yaml", &content);

    let err = loader_with(&[]).load(&path).unwrap_err();
    assert_eq!(err.field(), Some("server"));
}

// =============================================================================
// End-to-End Tests
// =============================================================================

#[tokio::test]
async fn test_config_drives_token_validity() {
    let (_dir, path) = write_config("inkwell.yaml", YAML);
    let config = loader_with(&[("BLOG_SECRET", TEST_SECRET)])
        .load(&path)
        .unwrap();

    let app = TestApp::with_codec(Arc::new(TokenCodec::new(config.auth).unwrap()));
    let response = app.try_login("alice", PASSWORD).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["expires_in"], serde_json::json!(1800));
}
