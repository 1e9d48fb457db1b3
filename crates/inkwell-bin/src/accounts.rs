// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Account directories backing the login endpoint.
//!
//! Passwords are stored as argon2 PHC strings. Verification runs on the
//! blocking pool.

use anyhow::{anyhow, Context};
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use inkwell_api::{AccountDirectory, ApiError, ApiResult};
use inkwell_config::SeedAccount;
use inkwell_core::memory::{MemoryDatabase, MemoryTransaction};
use inkwell_core::types::SubjectId;
use inkwell_core::unit_of_work::TxScope;
use inkwell_store::{PgDatabase, PgTransaction};

const USER_KEY_PREFIX: &str = "user:";

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes `password` into an argon2id PHC string.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;

    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!(e.to_string()))
        .context("hashing failed")?
        .to_string();
    Ok(phc)
}

/// Returns `true` if `password` matches the PHC string `hash`.
///
/// An unparsable hash never matches.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!(error = %e, "Stored password hash is not a valid PHC string");
            false
        }
    }
}

async fn verify_blocking(hash: String, password: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&hash, &password))
        .await
        .map_err(|e| ApiError::internal(format!("password check aborted: {}", e)))
}

// =============================================================================
// MemoryAccounts
// =============================================================================

/// Accounts stored as `user:<username>` documents in a [`MemoryDatabase`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryAccounts;

impl MemoryAccounts {
    /// Loads seed accounts into `database`.
    pub fn seed(database: &MemoryDatabase, accounts: &[SeedAccount]) {
        for account in accounts {
            database.insert(
                format!("{}{}", USER_KEY_PREFIX, account.username),
                json!({
                    "user_id": account.user_id.get(),
                    "password_hash": account.password_hash,
                }),
            );
        }
    }
}

#[async_trait]
impl AccountDirectory<MemoryDatabase> for MemoryAccounts {
    async fn authenticate(
        &self,
        scope: &TxScope<MemoryTransaction>,
        username: &str,
        password: &str,
    ) -> ApiResult<Option<SubjectId>> {
        let record = scope
            .transaction()
            .await?
            .get(&format!("{}{}", USER_KEY_PREFIX, username));
        let Some(record) = record else {
            return Ok(None);
        };

        let user_id = record.get("user_id").and_then(|v| v.as_u64());
        let hash = record.get("password_hash").and_then(|v| v.as_str());
        let (Some(user_id), Some(hash)) = (user_id, hash) else {
            warn!(username, "Account record is malformed");
            return Ok(None);
        };

        let matched = verify_blocking(hash.to_string(), password.to_string()).await?;
        Ok(matched.then_some(SubjectId::new(user_id)))
    }
}

// =============================================================================
// PgAccounts
// =============================================================================

/// Accounts stored in the `users` table.
///
/// Expects `id BIGINT`, `username TEXT UNIQUE` and `password_hash TEXT`
/// columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgAccounts;

#[async_trait]
impl AccountDirectory<PgDatabase> for PgAccounts {
    async fn authenticate(
        &self,
        scope: &TxScope<PgTransaction>,
        username: &str,
        password: &str,
    ) -> ApiResult<Option<SubjectId>> {
        let row = {
            let tx = scope.transaction().await?;
            tx.query_opt(
                "SELECT id, password_hash FROM users WHERE username = $1",
                &[&username],
            )
            .await?
        };
        let Some(row) = row else {
            return Ok(None);
        };

        let id: i64 = row
            .try_get("id")
            .map_err(|e| ApiError::internal(format!("users.id: {}", e)))?;
        let hash: String = row
            .try_get("password_hash")
            .map_err(|e| ApiError::internal(format!("users.password_hash: {}", e)))?;
        let Ok(id) = u64::try_from(id) else {
            warn!(username, id, "Account has a negative id");
            return Ok(None);
        };

        let matched = verify_blocking(hash, password.to_string()).await?;
        Ok(matched.then_some(SubjectId::new(id)))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_core::unit_of_work::UnitOfWork;
    use std::sync::Arc;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "correct horse"));
        assert!(!verify_password(&hash, "battery staple"));
    }

    #[test]
    fn test_invalid_hash_never_matches() {
        assert!(!verify_password("plaintext", "plaintext"));
    }

    #[tokio::test]
    async fn test_memory_accounts() {
        let database = Arc::new(MemoryDatabase::new());
        MemoryAccounts::seed(
            &database,
            &[SeedAccount {
                username: "alice".to_string(),
                password_hash: hash_password("secret").unwrap(),
                user_id: SubjectId::new(42),
            }],
        );

        let (ok, wrong, missing) = UnitOfWork::new(database)
            .run_with_result(&TxScope::new(), |scope| async move {
                let accounts = MemoryAccounts;
                let ok = accounts.authenticate(&scope, "alice", "secret").await?;
                let wrong = accounts.authenticate(&scope, "alice", "wrong").await?;
                let missing = accounts.authenticate(&scope, "bob", "secret").await?;
                Ok::<_, ApiError>((ok, wrong, missing))
            })
            .await
            .unwrap();

        assert_eq!(ok, Some(SubjectId::new(42)));
        assert_eq!(wrong, None);
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_memory_accounts_outside_transaction() {
        let result = MemoryAccounts
            .authenticate(&TxScope::new(), "alice", "secret")
            .await;
        assert!(result.is_err());
    }
}
