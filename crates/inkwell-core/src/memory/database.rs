// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory transactional document map.
//!
//! Transactions stage their writes privately and apply them in one step on
//! commit. Reads inside a transaction see its own staged writes; nothing is
//! visible to other readers before commit.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::trace;

use crate::database::{Database, Transaction};
use crate::error::TransactionError;

struct Shared {
    data: RwLock<BTreeMap<String, Value>>,
    open: AtomicUsize,
    begun: AtomicU64,
    available: AtomicBool,
}

// =============================================================================
// MemoryDatabase
// =============================================================================

/// An in-memory [`Database`] holding JSON documents by key.
#[derive(Clone)]
pub struct MemoryDatabase {
    shared: Arc<Shared>,
}

impl MemoryDatabase {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                data: RwLock::new(BTreeMap::new()),
                open: AtomicUsize::new(0),
                begun: AtomicU64::new(0),
                available: AtomicBool::new(true),
            }),
        }
    }

    /// Reads a committed document.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.shared.data.read().get(key).cloned()
    }

    /// Writes a document outside of any transaction (seeding).
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.shared.data.write().insert(key.into(), value);
    }

    /// Returns the number of transactions not yet finished or dropped.
    pub fn open_transactions(&self) -> usize {
        self.shared.open.load(Ordering::SeqCst)
    }

    /// Returns how many transactions were ever begun.
    pub fn begin_count(&self) -> u64 {
        self.shared.begun.load(Ordering::SeqCst)
    }

    /// Simulates the database going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.shared.available.store(available, Ordering::SeqCst);
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDatabase")
            .field("documents", &self.shared.data.read().len())
            .field("open_transactions", &self.open_transactions())
            .finish()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    type Tx = MemoryTransaction;

    fn name(&self) -> &str {
        "memory"
    }

    async fn begin(&self) -> Result<MemoryTransaction, TransactionError> {
        if !self.shared.available.load(Ordering::SeqCst) {
            return Err(TransactionError::begin("memory database is offline"));
        }
        self.shared.open.fetch_add(1, Ordering::SeqCst);
        self.shared.begun.fetch_add(1, Ordering::SeqCst);

        Ok(MemoryTransaction {
            shared: Arc::clone(&self.shared),
            writes: BTreeMap::new(),
            committed: false,
        })
    }
}

// =============================================================================
// MemoryTransaction
// =============================================================================

/// A transaction over a [`MemoryDatabase`].
///
/// Dropping an uncommitted transaction discards its writes.
pub struct MemoryTransaction {
    shared: Arc<Shared>,
    /// Staged writes; `None` marks a deletion.
    writes: BTreeMap<String, Option<Value>>,
    committed: bool,
}

impl MemoryTransaction {
    /// Reads a document, seeing this transaction's own writes.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.writes.get(key) {
            Some(staged) => staged.clone(),
            None => self.shared.data.read().get(key).cloned(),
        }
    }

    /// Stages a write.
    pub fn put(&mut self, key: impl Into<String>, value: Value) {
        self.writes.insert(key.into(), Some(value));
    }

    /// Stages a deletion.
    pub fn delete(&mut self, key: impl Into<String>) {
        self.writes.insert(key.into(), None);
    }

    /// Returns the number of staged writes.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }
}

impl fmt::Debug for MemoryTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTransaction")
            .field("pending_writes", &self.writes.len())
            .field("committed", &self.committed)
            .finish()
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn commit(mut self) -> Result<(), TransactionError> {
        if !self.shared.available.load(Ordering::SeqCst) {
            return Err(TransactionError::commit("memory database is offline"));
        }

        let writes = std::mem::take(&mut self.writes);
        let mut data = self.shared.data.write();
        for (key, value) in writes {
            match value {
                Some(value) => data.insert(key, value),
                None => data.remove(&key),
            };
        }
        self.committed = true;
        Ok(())
    }

    async fn rollback(mut self) -> Result<(), TransactionError> {
        self.writes.clear();
        Ok(())
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if !self.committed && !self.writes.is_empty() {
            trace!(discarded = self.writes.len(), "Discarding uncommitted writes");
        }
        self.shared.open.fetch_sub(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Tests
// =============================================================================
