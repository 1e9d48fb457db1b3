// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request-scoped unit of work.
//!
//! [`UnitOfWork::run`] opens one transaction, hands the operation a
//! [`TxScope`] carrying it, and commits or rolls back depending on the
//! outcome. Persistence code reaches the active transaction through
//! [`TxScope::transaction`].
//!
//! # Exit paths
//!
//! | Operation outcome | Effect                                  |
//! |-------------------|-----------------------------------------|
//! | `Ok(value)`       | commit, then `Ok(value)`                |
//! | `Err(error)`      | rollback, then `Err(error)`             |
//! | panic             | rollback, then the panic resumes        |
//! | future dropped    | the transaction is dropped (rollback)   |
//!
//! When the scope passed in already carries a transaction, the operation runs
//! inside it and the outermost call alone finishes it.
//!
//! # Example
//!
//! ```rust,ignore
//! let scope = TxScope::new();
//! let id = uow
//!     .run_with_result(&scope, |scope| async move {
//!         let mut tx = scope.transaction().await?;
//!         tx.put("article:1", json!({"title": "Hello"}));
//!         Ok::<_, TransactionError>(1)
//!     })
//!     .await?;
//! ```

use std::fmt;
use std::future::Future;
use std::panic::{resume_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::{trace, warn};

use crate::database::{Database, Transaction};
use crate::error::TransactionError;

// =============================================================================
// TxScope
// =============================================================================

/// Carrier through which persistence calls locate the active transaction.
///
/// Clones share the same slot. A scope belongs to a single request and is
/// passed explicitly down the call chain.
pub struct TxScope<T> {
    inner: Arc<ScopeInner<T>>,
}

struct ScopeInner<T> {
    slot: Mutex<Option<T>>,
    active: AtomicBool,
}

impl<T> TxScope<T> {
    /// Creates a scope with no transaction.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                slot: Mutex::new(None),
                active: AtomicBool::new(false),
            }),
        }
    }

    /// Returns `true` if a transaction is installed.
    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Borrows the active transaction.
    ///
    /// The returned guard must be released before a nested operation asks
    /// for the transaction again.
    pub async fn transaction(&self) -> Result<MappedMutexGuard<'_, T>, TransactionError> {
        let guard = self.inner.slot.lock().await;
        MutexGuard::try_map(guard, |slot| slot.as_mut())
            .map_err(|_| TransactionError::NoActiveTransaction)
    }

    async fn install(&self, tx: T) {
        let mut slot = self.inner.slot.lock().await;
        *slot = Some(tx);
        self.inner.active.store(true, Ordering::Release);
    }

    async fn take(&self) -> Option<T> {
        let mut slot = self.inner.slot.lock().await;
        self.inner.active.store(false, Ordering::Release);
        slot.take()
    }

    /// Drops the installed transaction without waiting for the lock holder.
    fn detach(&self) -> Option<T> {
        let mut slot = self.inner.slot.try_lock().ok()?;
        self.inner.active.store(false, Ordering::Release);
        slot.take()
    }
}

impl<T> Clone for TxScope<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for TxScope<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TxScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxScope")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Rolls back the installed transaction if `run` is abandoned mid-flight.
struct DetachOnDrop<'a, T> {
    scope: &'a TxScope<T>,
}

impl<T> Drop for DetachOnDrop<'_, T> {
    fn drop(&mut self) {
        if let Some(tx) = self.scope.detach() {
            warn!("Unit of work abandoned, rolling back");
            drop(tx);
        }
    }
}

// =============================================================================
// UnitOfWork
// =============================================================================

/// Runs operations inside a single transaction of `D`.
pub struct UnitOfWork<D> {
    database: Arc<D>,
}

impl<D: Database> UnitOfWork<D> {
    /// Creates a unit of work over the given database.
    pub fn new(database: Arc<D>) -> Self {
        Self { database }
    }

    /// Returns the underlying database.
    pub fn database(&self) -> &Arc<D> {
        &self.database
    }

    /// Runs `operation` atomically.
    pub async fn run<F, Fut, E>(&self, ambient: &TxScope<D::Tx>, operation: F) -> Result<(), E>
    where
        F: FnOnce(TxScope<D::Tx>) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: From<TransactionError>,
    {
        self.run_with_result(ambient, operation).await
    }

    /// Runs `operation` atomically and returns its value on commit.
    pub async fn run_with_result<F, Fut, R, E>(
        &self,
        ambient: &TxScope<D::Tx>,
        operation: F,
    ) -> Result<R, E>
    where
        F: FnOnce(TxScope<D::Tx>) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: From<TransactionError>,
    {
        if ambient.is_active() {
            trace!("Joining ambient transaction");
            return operation(ambient.clone()).await;
        }

        let tx = self.database.begin().await.map_err(E::from)?;
        trace!(backend = self.database.name(), "Transaction started");
        ambient.install(tx).await;
        let _detach = DetachOnDrop { scope: ambient };

        let outcome = AssertUnwindSafe(operation(ambient.clone()))
            .catch_unwind()
            .await;
        let tx = ambient.take().await;

        match outcome {
            Ok(Ok(value)) => {
                let tx = tx.ok_or(TransactionError::NoActiveTransaction)?;
                tx.commit().await?;
                trace!("Transaction committed");
                Ok(value)
            }
            Ok(Err(error)) => {
                rollback_quietly(tx).await;
                Err(error)
            }
            Err(panic) => {
                rollback_quietly(tx).await;
                resume_unwind(panic)
            }
        }
    }
}

impl<D> Clone for UnitOfWork<D> {
    fn clone(&self) -> Self {
        Self {
            database: Arc::clone(&self.database),
        }
    }
}

impl<D> fmt::Debug for UnitOfWork<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitOfWork").finish_non_exhaustive()
    }
}

async fn rollback_quietly<T: Transaction>(tx: Option<T>) {
    let Some(tx) = tx else { return };
    match tx.rollback().await {
        Ok(()) => trace!("Transaction rolled back"),
        Err(e) => warn!(error = %e, "Rollback failed"),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryDatabase, MemoryTransaction};
    use serde_json::json;

    type Scope = TxScope<MemoryTransaction>;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Tx(TransactionError),
        Business(&'static str),
    }

    impl From<TransactionError> for TestError {
        fn from(e: TransactionError) -> Self {
            TestError::Tx(e)
        }
    }

    fn setup() -> (Arc<MemoryDatabase>, UnitOfWork<MemoryDatabase>) {
        let db = Arc::new(MemoryDatabase::new());
        let uow = UnitOfWork::new(db.clone());
        (db, uow)
    }

    async fn write(scope: &Scope, key: &str, value: i64) -> Result<(), TestError> {
        let mut tx = scope.transaction().await?;
        tx.put(key, json!(value));
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_on_success() {
        let (db, uow) = setup();
        let scope = Scope::new();

        uow.run(&scope, |scope| async move {
            write(&scope, "a", 1).await?;
            write(&scope, "b", 2).await
        })
        .await
        .unwrap();

        assert_eq!(db.get("a"), Some(json!(1)));
        assert_eq!(db.get("b"), Some(json!(2)));
        assert!(!scope.is_active());
        assert_eq!(db.open_transactions(), 0);
    }

    #[tokio::test]
    async fn test_rollback_on_error() {
        let (db, uow) = setup();
        let scope = Scope::new();

        let result = uow
            .run(&scope, |scope| async move {
                write(&scope, "a", 1).await?;
                Err(TestError::Business("nope"))
            })
            .await;

        assert_eq!(result, Err(TestError::Business("nope")));
        assert_eq!(db.get("a"), None);
        assert_eq!(db.open_transactions(), 0);
    }

    #[tokio::test]
    async fn test_run_with_result() {
        let (db, uow) = setup();

        let value = uow
            .run_with_result(&Scope::new(), |scope| async move {
                write(&scope, "n", 5).await?;
                Ok::<_, TestError>(5)
            })
            .await;
        assert_eq!(value, Ok(5));

        let value: Result<i64, TestError> = uow
            .run_with_result(&Scope::new(), |scope| async move {
                write(&scope, "m", 6).await?;
                Err(TestError::Business("fail"))
            })
            .await;
        assert_eq!(value, Err(TestError::Business("fail")));
        assert_eq!(db.get("n"), Some(json!(5)));
        assert_eq!(db.get("m"), None);
    }

    #[tokio::test]
    async fn test_nested_run_reuses_transaction() {
        let (db, uow) = setup();
        let scope = Scope::new();
        let inner_uow = uow.clone();

        let result = uow
            .run(&scope, |scope| async move {
                write(&scope, "outer", 1).await?;
                inner_uow
                    .run(&scope, |scope| async move { write(&scope, "inner", 2).await })
                    .await?;
                // Inner success is not a commit; the outer failure discards both.
                Err(TestError::Business("outer failed"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(db.begin_count(), 1);
        assert_eq!(db.get("outer"), None);
        assert_eq!(db.get("inner"), None);
    }

    #[tokio::test]
    async fn test_persistence_outside_scope_fails() {
        let scope = Scope::new();
        let err = write(&scope, "x", 1).await.unwrap_err();
        assert_eq!(err, TestError::Tx(TransactionError::NoActiveTransaction));
    }

    #[tokio::test]
    async fn test_panic_rolls_back() {
        let (db, uow) = setup();
        let scope = Scope::new();

        let task = {
            let uow = uow.clone();
            let scope = scope.clone();
            tokio::spawn(async move {
                uow.run(&scope, |scope| async move {
                    write(&scope, "a", 1).await?;
                    if scope.is_active() {
                        panic!("boom");
                    }
                    Ok::<(), TestError>(())
                })
                .await
            })
        };

        assert!(task.await.unwrap_err().is_panic());
        assert_eq!(db.get("a"), None);
        assert!(!scope.is_active());
        assert_eq!(db.open_transactions(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_rolls_back() {
        let (db, uow) = setup();
        let scope = Scope::new();

        let run = uow.run(&scope, |scope| async move {
            write(&scope, "a", 1).await?;
            std::future::pending::<()>().await;
            Ok::<(), TestError>(())
        });
        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(10), run).await;

        assert!(timed_out.is_err());
        assert!(!scope.is_active());
        assert_eq!(db.get("a"), None);
        assert_eq!(db.open_transactions(), 0);
    }

    #[tokio::test]
    async fn test_begin_failure_propagates() {
        let (db, uow) = setup();
        db.set_available(false);

        let result = uow
            .run(&Scope::new(), |_scope| async move { Ok::<(), TestError>(()) })
            .await;

        assert!(matches!(result, Err(TestError::Tx(TransactionError::Begin { .. }))));
    }
}
