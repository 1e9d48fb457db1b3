// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use inkwell_core::database::Database;
use inkwell_core::kv::KeyValueStore;
use inkwell_core::session::SessionDirectory;
use inkwell_core::token::{TokenCodec, TokenConfig};
use inkwell_core::unit_of_work::UnitOfWork;

use crate::accounts::AccountDirectory;
use crate::auth::AuthGate;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// Generic over the persistence backend so that handlers run the same unit
/// of work against PostgreSQL in production and memory in tests.
pub struct AppState<D: Database> {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Credential codec.
    pub codec: Arc<TokenCodec>,
    /// Live session directory.
    pub sessions: SessionDirectory,
    /// Authentication gate.
    pub gate: Arc<AuthGate>,
    /// Unit of work over the database.
    pub unit_of_work: UnitOfWork<D>,
    /// Account lookup for login.
    pub accounts: Arc<dyn AccountDirectory<D>>,
}

impl<D: Database> AppState<D> {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder<D> {
        AppStateBuilder::new()
    }

    /// Returns the token codec.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Returns the session directory.
    pub fn sessions(&self) -> &SessionDirectory {
        &self.sessions
    }
}

impl<D: Database> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            codec: self.codec.clone(),
            sessions: self.sessions.clone(),
            gate: self.gate.clone(),
            unit_of_work: self.unit_of_work.clone(),
            accounts: self.accounts.clone(),
        }
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
pub struct AppStateBuilder<D: Database> {
    config: Option<ApiConfig>,
    token_config: Option<TokenConfig>,
    codec: Option<Arc<TokenCodec>>,
    store: Option<Arc<dyn KeyValueStore>>,
    database: Option<Arc<D>>,
    accounts: Option<Arc<dyn AccountDirectory<D>>>,
}

impl<D: Database> AppStateBuilder<D> {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            token_config: None,
            codec: None,
            store: None,
            database: None,
            accounts: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the token configuration used to build the codec.
    pub fn token_config(mut self, config: TokenConfig) -> Self {
        self.token_config = Some(config);
        self
    }

    /// Sets a prebuilt token codec.
    pub fn codec(mut self, codec: Arc<TokenCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Sets the session store.
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the database.
    pub fn database(mut self, database: Arc<D>) -> Self {
        self.database = Some(database);
        self
    }

    /// Sets the account directory.
    pub fn accounts(mut self, accounts: Arc<dyn AccountDirectory<D>>) -> Self {
        self.accounts = Some(accounts);
        self
    }

    /// Builds the AppState.
    pub fn build(self) -> ApiResult<AppState<D>> {
        let config = self.config.unwrap_or_default();
        config.validate().map_err(ApiError::internal)?;

        let codec = match (self.codec, self.token_config) {
            (Some(codec), _) => codec,
            (None, Some(token_config)) => Arc::new(TokenCodec::new(token_config)?),
            (None, None) => return Err(ApiError::internal("token codec is not configured")),
        };
        let store = self
            .store
            .ok_or_else(|| ApiError::internal("session store is not configured"))?;
        let database = self
            .database
            .ok_or_else(|| ApiError::internal("database is not configured"))?;
        let accounts = self
            .accounts
            .ok_or_else(|| ApiError::internal("account directory is not configured"))?;

        let sessions = SessionDirectory::new(store, codec.clone());
        let gate = Arc::new(AuthGate::new(codec.clone(), sessions.clone()));

        Ok(AppState {
            config: Arc::new(config),
            codec,
            sessions,
            gate,
            unit_of_work: UnitOfWork::new(database),
            accounts,
        })
    }
}

impl<D: Database> Default for AppStateBuilder<D> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl<D: Database> axum::extract::FromRef<AppState<D>> for Arc<TokenCodec> {
    fn from_ref(state: &AppState<D>) -> Self {
        state.codec.clone()
    }
}

impl<D: Database> axum::extract::FromRef<AppState<D>> for SessionDirectory {
    fn from_ref(state: &AppState<D>) -> Self {
        state.sessions.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
