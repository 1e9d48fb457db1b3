// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Inkwell Integration Tests
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p inkwell-tests
//! cargo test -p inkwell-tests --test integration_session
//! cargo test -p inkwell-tests --test integration_unit_of_work
//! cargo test -p inkwell-tests --test integration_api
//! cargo test -p inkwell-tests --test integration_config
//! ```
//!
//! ## Test Categories
//!
//! - `integration_session.rs`: codec and session directory over the memory store
//! - `integration_unit_of_work.rs`: commit, rollback, nesting and abandonment
//! - `integration_api.rs`: the auth gate and session endpoints over HTTP
//! - `integration_config.rs`: file loading, placeholders and overrides
//!
//! ## Using the Harness
//!
//! ```rust,ignore
//! use inkwell_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::new();
//!     let token = app.login("alice", "wonderland").await;
//!     let response = app.get("/api/v1/profile", Some(&token)).await;
//!     assert_eq!(response.status, StatusCode::OK);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
    pub use axum::http::StatusCode;
}
