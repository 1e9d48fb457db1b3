// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Test fixtures: secrets, subjects and codecs.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use inkwell_core::memory::MemoryStore;
use inkwell_core::session::SessionDirectory;
use inkwell_core::token::{Claims, TokenCodec, TokenConfig};
use inkwell_core::types::{Credential, SubjectId};

/// Signing secret used by every fixture codec.
pub const TEST_SECRET: &str = "integration-test-secret-that-is-long-enough";

/// A secret different from [`TEST_SECRET`].
pub const OTHER_SECRET: &str = "another-integration-secret-of-sufficient-size";

/// The subject most scenarios log in as.
pub const ALICE: SubjectId = SubjectId::new(42);

/// A second subject for isolation checks.
pub const BOB: SubjectId = SubjectId::new(7);

/// Token configuration with a one hour validity window.
pub fn token_config() -> TokenConfig {
    TokenConfig::new(TEST_SECRET).with_validity(Duration::from_secs(3600))
}

/// Builds a codec from [`token_config`].
pub fn test_codec() -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(token_config()).expect("fixture codec"))
}

/// Builds a codec signing with [`OTHER_SECRET`].
pub fn other_codec() -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(TokenConfig::new(OTHER_SECRET)).expect("fixture codec"))
}

/// A memory store, a codec and a directory over them.
pub fn session_fixture() -> (Arc<MemoryStore>, Arc<TokenCodec>, SessionDirectory) {
    let store = Arc::new(MemoryStore::new());
    let codec = test_codec();
    let sessions = SessionDirectory::new(store.clone(), codec.clone());
    (store, codec, sessions)
}

/// Signs `count` distinct, currently valid credentials for `subject`.
///
/// Credentials issued within the same second are identical, so each one is
/// backdated by a further second.
pub fn distinct_credentials(codec: &TokenCodec, subject: SubjectId, count: usize) -> Vec<Credential> {
    let now = Utc::now().timestamp();
    (0..count as i64)
        .map(|offset| {
            let issued = now - offset;
            codec
                .encode(&Claims {
                    subject,
                    iat: issued,
                    nbf: issued,
                    exp: now + 3600,
                })
                .expect("fixture credential")
        })
        .collect()
}

/// Signs a credential whose validity window ended `ago` seconds in the past.
pub fn expired_credential(codec: &TokenCodec, subject: SubjectId, ago: i64) -> Credential {
    let now = Utc::now().timestamp();
    codec
        .encode(&Claims {
            subject,
            iat: now - 7200,
            nbf: now - 7200,
            exp: now - ago,
        })
        .expect("fixture credential")
}

/// Signs a credential that only becomes valid `ahead` seconds from now.
pub fn future_credential(codec: &TokenCodec, subject: SubjectId, ahead: i64) -> Credential {
    let now = Utc::now().timestamp();
    codec
        .encode(&Claims {
            subject,
            iat: now,
            nbf: now + ahead,
            exp: now + ahead + 3600,
        })
        .expect("fixture credential")
}

/// Formats a credential as an `Authorization` header value.
pub fn bearer(credential: &Credential) -> String {
    format!("Bearer {}", credential.as_str())
}

