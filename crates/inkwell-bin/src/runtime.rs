// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! Connects the configured session store and database, assembles the
//! application state and serves until shutdown.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use inkwell_api::{AccountDirectory, ApiServer, AppState};
use inkwell_config::{
    ConfigLoader, DatabaseBackend, InkwellConfig, SessionStoreConfig, StoreBackend,
};
use inkwell_core::database::Database;
use inkwell_core::kv::KeyValueStore;
use inkwell_core::memory::{MemoryDatabase, MemoryStore};
use inkwell_store::{PgDatabase, PgPoolOptions, RedisStore};

use crate::accounts::{MemoryAccounts, PgAccounts};
use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// Runtime
// =============================================================================

/// The service runtime.
pub struct Runtime {
    config: Arc<InkwellConfig>,
    shutdown: ShutdownCoordinator,
}

impl Runtime {
    /// Creates a runtime for a validated configuration.
    pub fn new(config: InkwellConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &InkwellConfig {
        &self.config
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Runs the service until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting Inkwell v{}", inkwell_core::VERSION);

        let store = connect_store(&self.config.session_store).await?;
        let database = &self.config.database;

        match database.backend {
            DatabaseBackend::Memory => {
                warn!("Using the in-memory database; accounts come from database.seed_accounts");
                let db = Arc::new(MemoryDatabase::new());
                MemoryAccounts::seed(&db, &database.seed_accounts);
                self.serve(db, Arc::new(MemoryAccounts), store).await
            }
            DatabaseBackend::Postgres => {
                let url = database
                    .url
                    .as_deref()
                    .ok_or_else(|| BinError::config("database.url is not set"))?;
                let options = PgPoolOptions::new(
                    database.pool_size,
                    Duration::from_secs(database.connect_timeout_secs),
                );
                let db = PgDatabase::connect(url, options).await?;
                self.serve(Arc::new(db), Arc::new(PgAccounts), store).await
            }
        }
    }

    async fn serve<D: Database>(
        &self,
        database: Arc<D>,
        accounts: Arc<dyn AccountDirectory<D>>,
        store: Arc<dyn KeyValueStore>,
    ) -> BinResult<()> {
        let state = AppState::builder()
            .config(self.config.server.clone())
            .token_config(self.config.auth.clone())
            .store(store)
            .database(database)
            .accounts(accounts)
            .build()?;
        let server = ApiServer::new(state);

        info!(
            addr = %server.addr(),
            store = ?self.config.session_store.backend,
            database = ?self.config.database.backend,
            "Inkwell is ready"
        );

        self.shutdown.listen_for_os_signals();
        let mut handle = tokio::spawn(server.run_with_shutdown(self.shutdown.signal()));

        tokio::select! {
            result = &mut handle => return flatten(result),
            _ = self.shutdown.signal() => {}
        }

        let grace = self.config.server.shutdown_timeout;
        match tokio::time::timeout(grace, handle).await {
            Ok(result) => {
                info!("Inkwell shutdown complete");
                flatten(result)
            }
            Err(_) => {
                warn!(timeout_secs = grace.as_secs(), "Graceful shutdown timed out");
                Ok(())
            }
        }
    }
}

fn flatten(
    result: Result<inkwell_api::ApiResult<()>, tokio::task::JoinError>,
) -> BinResult<()> {
    match result {
        Ok(result) => result.map_err(BinError::from),
        Err(e) => Err(BinError::runtime(format!("server task failed: {}", e))),
    }
}

/// Connects the configured session store.
pub async fn connect_store(config: &SessionStoreConfig) -> BinResult<Arc<dyn KeyValueStore>> {
    match config.backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory session store; sessions are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Redis => {
            let url = config
                .url
                .as_deref()
                .ok_or_else(|| BinError::config("session_store.url is not set"))?;
            Ok(Arc::new(RedisStore::connect(url).await?))
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
#[derive(Debug, Default)]
pub struct RuntimeBuilder {
    config_path: Option<std::path::PathBuf>,
    config: Option<InkwellConfig>,
    port: Option<u16>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: InkwellConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the listening port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<Runtime> {
        let mut config = match self.config {
            Some(config) => config,
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::config("No configuration provided"))?;
                ConfigLoader::new().load(&path)?
            }
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }
        config.validate()?;

        Ok(Runtime::new(config))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_core::token::TokenConfig;

    fn test_config() -> InkwellConfig {
        InkwellConfig {
            auth: TokenConfig::new("test-secret-key-that-is-long-enough"),
            ..Default::default()
        }
    }

    #[test]
    fn test_runtime_builder_port_override() {
        let runtime = RuntimeBuilder::new()
            .config(test_config())
            .port(Some(9191))
            .build()
            .unwrap();

        assert_eq!(runtime.config().server.port, 9191);
    }

    #[test]
    fn test_runtime_builder_requires_config() {
        assert!(RuntimeBuilder::new().build().is_err());
    }

    #[test]
    fn test_runtime_builder_validates() {
        let result = RuntimeBuilder::new().config(InkwellConfig::default()).build();
        assert!(matches!(result, Err(BinError::Config(_))));
    }

    #[tokio::test]
    async fn test_memory_store_connects() {
        let store = connect_store(&SessionStoreConfig::default()).await.unwrap();
        assert_eq!(store.name(), "memory");
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_stops_server() {
        let mut config = test_config();
        config.server.port = 0;
        let runtime = Runtime::new(config);
        let shutdown = runtime.shutdown().clone();

        let task = tokio::spawn(runtime.run());
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        shutdown.initiate_shutdown();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
