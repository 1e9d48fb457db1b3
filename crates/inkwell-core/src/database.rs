// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Persistence backend contract.
//!
//! A [`Database`] hands out exclusively owned [`Transaction`] handles. A
//! handle is finished by consuming it with `commit` or `rollback`; a handle
//! dropped without being finished must roll back.

use async_trait::async_trait;

use crate::error::TransactionError;

/// A persistence backend able to open transactions.
#[async_trait]
pub trait Database: Send + Sync + 'static {
    /// The transaction handle type of this backend.
    type Tx: Transaction;

    /// Returns the backend name for logging.
    fn name(&self) -> &str;

    /// Begins a new transaction.
    async fn begin(&self) -> Result<Self::Tx, TransactionError>;
}

/// An in-flight atomic unit of work.
///
/// Implementations roll back when dropped without `commit` or `rollback`.
#[async_trait]
pub trait Transaction: Send + Sized + 'static {
    /// Makes every write of this transaction durable.
    async fn commit(self) -> Result<(), TransactionError>;

    /// Discards every write of this transaction.
    async fn rollback(self) -> Result<(), TransactionError>;
}
