// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Key/value store contract used by the session directory.
//!
//! A backend supports plain string values and string sets, both with an
//! optional per-key TTL. A missing key is reported as `Ok(None)` or an empty
//! set, never as an error; an unreachable backend is always
//! [`StoreError::Unavailable`].

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Remote key/value store with TTL and set membership.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the backend name for logging.
    fn name(&self) -> &str;

    /// Returns the string value stored at `key`.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores a string value that expires after `ttl`.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Deletes the given keys, returning how many existed.
    async fn delete(&self, keys: &[String]) -> StoreResult<u64>;

    /// Adds `member` to the set at `key`.
    async fn set_add(&self, key: &str, member: &str) -> StoreResult<()>;

    /// Removes `member` from the set at `key`.
    async fn set_remove(&self, key: &str, member: &str) -> StoreResult<()>;

    /// Returns every member of the set at `key`.
    async fn set_members(&self, key: &str) -> StoreResult<Vec<String>>;

    /// Sets the TTL of an existing key. Returns `false` if the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool>;

    /// Checks connectivity.
    async fn ping(&self) -> StoreResult<()>;
}
