// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # inkwell-api
//!
//! HTTP surface of the Inkwell blog backend's authentication subsystem.
//!
//! Every protected route passes through the [`AuthGate`], which checks the
//! bearer credential's signature and expiry and then confirms it is still a
//! live session. Login, logout and profile endpoints run on top of the
//! session directory and the unit of work from `inkwell-core`.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod accounts;
pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use accounts::AccountDirectory;
pub use auth::{parse_bearer, AuthGate, Identity};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use extractors::{Auth, OptionalAuth, ValidatedJson};
pub use middleware::{AuthLayer, AuthMiddleware};
pub use server::ApiServer;
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
