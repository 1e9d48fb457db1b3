// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! PostgreSQL-backed unit-of-work database.
//!
//! Connections come from a `bb8` pool that tests each connection on checkout
//! and replaces broken ones. A transaction owns its pooled connection from
//! `BEGIN` until `COMMIT`/`ROLLBACK`. A transaction dropped mid-flight hands
//! the connection to a background `ROLLBACK`, and the connection only returns
//! to the pool once that statement has finished.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bb8::{Pool, PooledConnection, RunError};
use bb8_postgres::PostgresConnectionManager;
use tokio::runtime::Handle;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{info, warn};

use inkwell_core::database::{Database, Transaction};
use inkwell_core::error::TransactionError;

type Manager = PostgresConnectionManager<NoTls>;
type Connection = PooledConnection<'static, Manager>;

/// Default time to wait for a pooled connection.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// PgPoolOptions
// =============================================================================

/// Sizing and checkout limits for the connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgPoolOptions {
    /// Maximum number of open connections. At least 1.
    pub max_size: u32,
    /// How long `begin` waits for a connection before failing.
    pub connection_timeout: Duration,
}

impl PgPoolOptions {
    /// Creates options for `pool_size` connections.
    pub fn new(pool_size: usize, connection_timeout: Duration) -> Self {
        Self {
            max_size: u32::try_from(pool_size).unwrap_or(u32::MAX).max(1),
            connection_timeout,
        }
    }
}

impl Default for PgPoolOptions {
    fn default() -> Self {
        Self::new(4, DEFAULT_CONNECTION_TIMEOUT)
    }
}

// =============================================================================
// PgDatabase
// =============================================================================

/// A [`Database`] over a pool of PostgreSQL connections.
#[derive(Clone)]
pub struct PgDatabase {
    pool: Pool<Manager>,
    options: PgPoolOptions,
}

impl PgDatabase {
    /// Builds the pool and checks that `url` is reachable.
    pub async fn connect(url: &str, options: PgPoolOptions) -> Result<Self, TransactionError> {
        let database = Self::build(url, options)?;
        database
            .pool
            .get()
            .await
            .map_err(|e| checkout_error(e, options.connection_timeout))?;

        info!(
            max_connections = options.max_size,
            timeout_ms = options.connection_timeout.as_millis() as u64,
            "Connected to PostgreSQL"
        );
        Ok(database)
    }

    /// Builds the pool without opening a connection.
    ///
    /// Fails only when `url` is not a valid connection string.
    pub fn build(url: &str, options: PgPoolOptions) -> Result<Self, TransactionError> {
        let manager = PostgresConnectionManager::new_from_stringlike(url, NoTls)
            .map_err(|e| TransactionError::begin(format!("invalid database url: {}", e)))?;

        let pool = Pool::builder()
            .max_size(options.max_size)
            .connection_timeout(options.connection_timeout)
            .test_on_check_out(true)
            .build_unchecked(manager);

        Ok(Self { pool, options })
    }

    /// Returns the pool limits.
    pub fn options(&self) -> PgPoolOptions {
        self.options
    }

    /// Returns the number of open connections, idle or checked out.
    pub fn connections(&self) -> u32 {
        self.pool.state().connections
    }
}

fn checkout_error(error: RunError<tokio_postgres::Error>, timeout: Duration) -> TransactionError {
    match error {
        RunError::User(e) => TransactionError::begin(format!("connect failed: {}", e)),
        RunError::TimedOut => TransactionError::begin(format!(
            "no connection available within {}ms",
            timeout.as_millis()
        )),
    }
}

impl fmt::Debug for PgDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgDatabase")
            .field("options", &self.options)
            .field("connections", &self.connections())
            .finish()
    }
}

#[async_trait]
impl Database for PgDatabase {
    type Tx = PgTransaction;

    fn name(&self) -> &str {
        "postgres"
    }

    async fn begin(&self) -> Result<PgTransaction, TransactionError> {
        let client = self
            .pool
            .get_owned()
            .await
            .map_err(|e| checkout_error(e, self.options.connection_timeout))?;
        client
            .batch_execute("BEGIN")
            .await
            .map_err(|e| TransactionError::begin(e.to_string()))?;

        Ok(PgTransaction {
            client: Some(client),
        })
    }
}

// =============================================================================
// PgTransaction
// =============================================================================

/// An open PostgreSQL transaction.
pub struct PgTransaction {
    client: Option<Connection>,
}

impl PgTransaction {
    /// Returns the connection the transaction runs on.
    pub fn client(&self) -> Result<&Client, TransactionError> {
        self.client
            .as_deref()
            .ok_or(TransactionError::NoActiveTransaction)
    }

    /// Runs a query expected to return at most one row.
    pub async fn query_opt(
        &self,
        statement: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, TransactionError> {
        self.client()?
            .query_opt(statement, params)
            .await
            .map_err(|e| TransactionError::query(e.to_string()))
    }

    /// Runs a query and returns every row.
    pub async fn query(
        &self,
        statement: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, TransactionError> {
        self.client()?
            .query(statement, params)
            .await
            .map_err(|e| TransactionError::query(e.to_string()))
    }

    /// Executes a statement, returning the number of affected rows.
    pub async fn execute(
        &self,
        statement: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, TransactionError> {
        self.client()?
            .execute(statement, params)
            .await
            .map_err(|e| TransactionError::query(e.to_string()))
    }
}

impl fmt::Debug for PgTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgTransaction")
            .field("open", &self.client.is_some())
            .finish()
    }
}

#[async_trait]
impl Transaction for PgTransaction {
    async fn commit(mut self) -> Result<(), TransactionError> {
        let client = self.client.take().ok_or(TransactionError::NoActiveTransaction)?;
        client
            .batch_execute("COMMIT")
            .await
            .map_err(|e| TransactionError::commit(e.to_string()))
    }

    async fn rollback(mut self) -> Result<(), TransactionError> {
        let client = self.client.take().ok_or(TransactionError::NoActiveTransaction)?;
        client
            .batch_execute("ROLLBACK")
            .await
            .map_err(|e| TransactionError::rollback(e.to_string()))
    }
}

impl Drop for PgTransaction {
    fn drop(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };
        match Handle::try_current() {
            Ok(handle) => {
                // The pooled connection is released when the task ends.
                handle.spawn(async move {
                    if let Err(e) = client.batch_execute("ROLLBACK").await {
                        warn!(error = %e, "Rollback of abandoned transaction failed");
                    }
                });
            }
            Err(_) => {
                warn!("Transaction dropped outside a runtime, connection left mid-transaction");
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
