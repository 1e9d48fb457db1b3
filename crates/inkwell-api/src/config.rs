// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_BASE_PATH: &str = "/api/v1";

// =============================================================================
// ApiConfig
// =============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Listen address.
    pub host: IpAddr,
    /// Listen port. `0` picks a free port.
    pub port: u16,
    /// Prefix every session endpoint is mounted under.
    pub base_path: String,
    /// Request timeout. An expired request drops its in-flight transaction.
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    /// Graceful shutdown timeout.
    #[serde(with = "duration_secs")]
    pub shutdown_timeout: Duration,
    /// Paths reachable without a credential. A trailing `*` matches a prefix.
    pub public_paths: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            base_path: DEFAULT_BASE_PATH.to_string(),
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
            public_paths: session_public_paths(DEFAULT_BASE_PATH),
        }
    }
}

impl ApiConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Mounts the API under `base_path`, moving login and health along.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self.public_paths = session_public_paths(&self.base_path);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_path.starts_with('/') || self.base_path.ends_with('/') {
            return Err(format!(
                "base_path must start with '/' and not end with '/': {}",
                self.base_path
            ));
        }
        if self.request_timeout.is_zero() {
            return Err("request_timeout must be positive".to_string());
        }
        for path in &self.public_paths {
            let pattern = path.strip_suffix('*').unwrap_or(path);
            if !pattern.starts_with('/') || pattern.contains('*') {
                return Err(format!(
                    "public path must be absolute with at most a trailing '*': {}",
                    path
                ));
            }
        }
        Ok(())
    }
}

/// Login and health stay reachable without a credential.
fn session_public_paths(base_path: &str) -> Vec<String> {
    vec![format!("{}/login", base_path), format!("{}/health", base_path)]
}

// =============================================================================
// Serialization Helpers
// =============================================================================

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// =============================================================================
// Tests
// =============================================================================
