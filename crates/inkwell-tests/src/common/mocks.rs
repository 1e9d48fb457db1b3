// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory collaborators for integration tests.

use async_trait::async_trait;
use serde_json::json;

use inkwell_api::{AccountDirectory, ApiResult};
use inkwell_core::memory::{MemoryDatabase, MemoryTransaction};
use inkwell_core::types::SubjectId;
use inkwell_core::unit_of_work::TxScope;

/// Key under which a successful login records the subject.
pub fn last_login_key(username: &str) -> String {
    format!("last_login:{}", username)
}

/// Account directory over plaintext `account:<username>` documents.
///
/// A successful login stages a `last_login:<username>` write in the
/// request's transaction, so tests can observe commit and rollback.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureAccounts;

impl FixtureAccounts {
    /// Stores an account in `database`.
    pub fn add(database: &MemoryDatabase, username: &str, password: &str, subject: SubjectId) {
        database.insert(
            format!("account:{}", username),
            json!({ "password": password, "user_id": subject.get() }),
        );
    }
}

#[async_trait]
impl AccountDirectory<MemoryDatabase> for FixtureAccounts {
    async fn authenticate(
        &self,
        scope: &TxScope<MemoryTransaction>,
        username: &str,
        password: &str,
    ) -> ApiResult<Option<SubjectId>> {
        let mut tx = scope.transaction().await?;
        let Some(record) = tx.get(&format!("account:{}", username)) else {
            return Ok(None);
        };

        let matches = record.get("password").and_then(|v| v.as_str()) == Some(password);
        let subject = record.get("user_id").and_then(|v| v.as_u64()).map(SubjectId::new);
        match (matches, subject) {
            (true, Some(subject)) => {
                tx.put(last_login_key(username), json!(subject.get()));
                Ok(Some(subject))
            }
            _ => Ok(None),
        }
    }
}
