// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # inkwell-store
//!
//! Production backends for the Inkwell core contracts.
//!
//! - [`RedisStore`]: session directory storage on Redis (`redis` feature)
//! - [`PgDatabase`]: unit-of-work transactions on PostgreSQL (`postgres` feature)
//!
//! The in-memory backends used for tests live in `inkwell_core::memory`.

#![warn(missing_docs)]
#![deny(unsafe_code)]

#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "redis")]
pub use crate::redis::RedisStore;

#[cfg(feature = "postgres")]
pub use crate::postgres::{PgDatabase, PgPoolOptions, PgTransaction};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Names of the backends compiled into this build.
pub fn compiled_backends() -> Vec<&'static str> {
    let mut backends = Vec::new();
    if cfg!(feature = "redis") {
        backends.push("redis");
    }
    if cfg!(feature = "postgres") {
        backends.push("postgres");
    }
    backends
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_features_compile_both_backends() {
        assert_eq!(compiled_backends(), vec!["redis", "postgres"]);
    }
}
