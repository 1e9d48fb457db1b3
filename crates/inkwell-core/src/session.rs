// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Revocable session directory.
//!
//! Every live credential has two records in the backing store:
//!
//! ```text
//! token:<credential>      -> "<subject>"            (TTL = validity window)
//! user_tokens:<subject>   -> { credential, ... }    (TTL refreshed on register)
//! ```
//!
//! The forward record is authoritative: a credential is live exactly when its
//! forward record exists. The reverse set only exists so that every session of
//! a user can be revoked at once, and may briefly name credentials whose
//! forward record already expired.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{SessionError, StoreError};
use crate::kv::KeyValueStore;
use crate::token::TokenCodec;
use crate::types::{Credential, SubjectId};

const TOKEN_PREFIX: &str = "token:";
const USER_TOKENS_PREFIX: &str = "user_tokens:";

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

// =============================================================================
// SessionDirectory
// =============================================================================

/// Tracks which credentials are live for each subject.
#[derive(Clone)]
pub struct SessionDirectory {
    store: Arc<dyn KeyValueStore>,
    codec: Arc<TokenCodec>,
}

impl SessionDirectory {
    /// Creates a directory over the given store.
    ///
    /// The codec is used to resolve the owner of a credential on revoke.
    pub fn new(store: Arc<dyn KeyValueStore>, codec: Arc<TokenCodec>) -> Self {
        Self { store, codec }
    }

    /// Returns the TTL used for sessions created at login.
    pub fn default_ttl(&self) -> Duration {
        self.codec.validity()
    }

    /// Returns the backing store.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Records `credential` as a live session of `subject`.
    pub async fn register(
        &self,
        credential: &Credential,
        subject: SubjectId,
        ttl: Duration,
    ) -> SessionResult<()> {
        let user_key = user_tokens_key(subject);

        self.store
            .set_with_ttl(&token_key(credential), &subject.to_string(), ttl)
            .await?;
        self.store.set_add(&user_key, credential.as_str()).await?;
        self.store.expire(&user_key, ttl).await?;

        debug!(subject = %subject, ttl_secs = ttl.as_secs(), "Session registered");
        Ok(())
    }

    /// Returns the subject owning `credential` if its session is live.
    ///
    /// Only the directory is consulted; the credential's signature and
    /// validity window are not checked here.
    pub async fn validate(&self, credential: &Credential) -> SessionResult<SubjectId> {
        let key = token_key(credential);
        let value = match self.store.get(&key).await {
            Ok(Some(value)) => value,
            Ok(None) => return Err(SessionError::Unknown),
            Err(StoreError::WrongType { .. }) => {
                warn!("Session record is not a string value");
                return Err(SessionError::Unknown);
            }
            Err(e) => return Err(e.into()),
        };

        value.parse::<SubjectId>().map_err(|e| {
            warn!(error = %e, "Session record holds an invalid subject");
            SessionError::Unknown
        })
    }

    /// Revokes a single session.
    ///
    /// The owner is resolved from the credential's claims, so revocation
    /// works even when the forward record already expired. Returns the
    /// owning subject.
    pub async fn revoke(&self, credential: &Credential) -> SessionResult<SubjectId> {
        let claims = self.codec.decode_ignoring_expiry(credential)?;

        self.store.delete(&[token_key(credential)]).await?;
        self.store
            .set_remove(&user_tokens_key(claims.subject), credential.as_str())
            .await?;

        debug!(subject = %claims.subject, "Session revoked");
        Ok(claims.subject)
    }

    /// Revokes every session of `subject`.
    ///
    /// Returns the number of credentials named in the subject's set.
    pub async fn revoke_all(&self, subject: SubjectId) -> SessionResult<usize> {
        let user_key = user_tokens_key(subject);
        let members = self.store.set_members(&user_key).await?;

        let mut keys: Vec<String> = members
            .iter()
            .map(|token| format!("{TOKEN_PREFIX}{token}"))
            .collect();
        keys.push(user_key);
        self.store.delete(&keys).await?;

        debug!(subject = %subject, count = members.len(), "All sessions revoked");
        Ok(members.len())
    }

    /// Returns the live sessions of `subject`.
    ///
    /// Set members whose forward record has expired are removed from the
    /// set as a side effect.
    pub async fn active_sessions(&self, subject: SubjectId) -> SessionResult<Vec<Credential>> {
        let user_key = user_tokens_key(subject);
        let members = self.store.set_members(&user_key).await?;

        let mut live = Vec::with_capacity(members.len());
        for token in members {
            if self.store.get(&format!("{TOKEN_PREFIX}{token}")).await?.is_some() {
                live.push(Credential::new(token));
            } else {
                self.store.set_remove(&user_key, &token).await?;
            }
        }
        Ok(live)
    }
}

impl fmt::Debug for SessionDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionDirectory")
            .field("store", &self.store.name())
            .field("codec", &self.codec)
            .finish()
    }
}

fn token_key(credential: &Credential) -> String {
    format!("{TOKEN_PREFIX}{}", credential.as_str())
}

fn user_tokens_key(subject: SubjectId) -> String {
    format!("{USER_TOKENS_PREFIX}{subject}")
}

// =============================================================================
// Tests
// =============================================================================
