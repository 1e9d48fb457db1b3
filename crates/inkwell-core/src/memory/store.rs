// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory key/value store.
//!
//! Entries carry an optional deadline measured on the tokio clock, so tests
//! running with a paused clock can drive expiry with `tokio::time::advance`.
//! Expired entries are removed lazily on access.
//!
//! # Thread Safety
//!
//! The map is protected by a `parking_lot::RwLock` that is never held across
//! an `.await`.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::time::Instant;

use crate::error::StoreError;
use crate::kv::{KeyValueStore, StoreResult};

// =============================================================================
// Entry
// =============================================================================

#[derive(Debug, Clone)]
enum Value {
    String(String),
    Set(BTreeSet<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// An in-memory [`KeyValueStore`].
#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
    available: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulates the store going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Returns the number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    /// Returns `true` if no live key exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the remaining TTL of `key`, if it has one.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.read();
        let entry = entries.get(key).filter(|entry| !entry.is_expired(now))?;
        entry.expires_at.map(|deadline| deadline - now)
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::unavailable("memory store is offline"))
        }
    }

    /// Removes `key` if it has expired.
    fn purge_expired(entries: &mut HashMap<String, Entry>, key: &str, now: Instant) {
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check_available()?;
        let now = Instant::now();
        let mut entries = self.entries.write();
        Self::purge_expired(&mut entries, key, now);

        match entries.get(key).map(|entry| &entry.value) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(Value::Set(_)) => Err(StoreError::wrong_type(key)),
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.check_available()?;
        let entry = Entry {
            value: Value::String(value.to_string()),
            expires_at: Some(Instant::now() + ttl),
        };
        self.entries.write().insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> StoreResult<u64> {
        self.check_available()?;
        let now = Instant::now();
        let mut entries = self.entries.write();

        let mut removed = 0;
        for key in keys {
            if let Some(entry) = entries.remove(key) {
                if !entry.is_expired(now) {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    async fn set_add(&self, key: &str, member: &str) -> StoreResult<()> {
        self.check_available()?;
        let now = Instant::now();
        let mut entries = self.entries.write();
        Self::purge_expired(&mut entries, key, now);

        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: Value::Set(BTreeSet::new()),
            expires_at: None,
        });
        match &mut entry.value {
            Value::Set(members) => {
                members.insert(member.to_string());
                Ok(())
            }
            Value::String(_) => Err(StoreError::wrong_type(key)),
        }
    }

    async fn set_remove(&self, key: &str, member: &str) -> StoreResult<()> {
        self.check_available()?;
        let now = Instant::now();
        let mut entries = self.entries.write();
        Self::purge_expired(&mut entries, key, now);

        let now_empty = match entries.get_mut(key).map(|entry| &mut entry.value) {
            None => return Ok(()),
            Some(Value::Set(members)) => {
                members.remove(member);
                members.is_empty()
            }
            Some(Value::String(_)) => return Err(StoreError::wrong_type(key)),
        };
        // Empty sets do not exist.
        if now_empty {
            entries.remove(key);
        }
        Ok(())
    }

    async fn set_members(&self, key: &str) -> StoreResult<Vec<String>> {
        self.check_available()?;
        let now = Instant::now();
        let mut entries = self.entries.write();
        Self::purge_expired(&mut entries, key, now);

        match entries.get(key).map(|entry| &entry.value) {
            None => Ok(Vec::new()),
            Some(Value::Set(members)) => Ok(members.iter().cloned().collect()),
            Some(Value::String(_)) => Err(StoreError::wrong_type(key)),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        self.check_available()?;
        let now = Instant::now();
        let mut entries = self.entries.write();
        Self::purge_expired(&mut entries, key, now);

        match entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(now + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_string_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set_with_ttl("k", "v", Duration::from_secs(10)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));

        assert_eq!(store.delete(&["k".to_string(), "missing".to_string()]).await.unwrap(), 1);
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let store = MemoryStore::new();
        store.set_with_ttl("k", "v", Duration::from_secs(10)).await.unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(store.get("k").await.unwrap().is_some());
        assert_eq!(store.ttl("k"), Some(Duration::from_secs(1)));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(store.get("k").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_operations_and_expire() {
        let store = MemoryStore::new();
        store.set_add("s", "b").await.unwrap();
        store.set_add("s", "a").await.unwrap();
        store.set_add("s", "a").await.unwrap();
        assert_eq!(store.set_members("s").await.unwrap(), vec!["a", "b"]);
        assert_eq!(store.ttl("s"), None);

        assert!(store.expire("s", Duration::from_secs(5)).await.unwrap());
        assert!(!store.expire("missing", Duration::from_secs(5)).await.unwrap());

        store.set_remove("s", "a").await.unwrap();
        assert_eq!(store.set_members("s").await.unwrap(), vec!["b"]);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(store.set_members("s").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_removing_last_member_deletes_set() {
        let store = MemoryStore::new();
        store.set_add("s", "only").await.unwrap();
        store.set_remove("s", "only").await.unwrap();

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_type() {
        let store = MemoryStore::new();
        store.set_add("s", "a").await.unwrap();
        store.set_with_ttl("k", "v", Duration::from_secs(10)).await.unwrap();

        assert_eq!(store.get("s").await, Err(StoreError::wrong_type("s")));
        assert_eq!(store.set_add("k", "a").await, Err(StoreError::wrong_type("k")));
    }

    #[tokio::test]
    async fn test_unavailable() {
        let store = MemoryStore::new();
        store.set_available(false);

        assert!(store.ping().await.unwrap_err().is_unavailable());
        assert!(store.get("k").await.unwrap_err().is_unavailable());

        store.set_available(true);
        assert!(store.ping().await.is_ok());
    }
}
