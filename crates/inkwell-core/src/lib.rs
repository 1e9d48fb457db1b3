// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # inkwell-core
//!
//! Authentication sessions and unit-of-work core for the Inkwell blog backend.
//!
//! This crate provides the pieces every request path depends on:
//!
//! - **Token**: `TokenCodec` issues and verifies signed bearer credentials
//! - **Session**: `SessionDirectory` tracks which credentials are live per user
//! - **UnitOfWork**: threads one transaction through multi-step persistence
//! - **Kv / Database**: collaborator contracts for the store and the database
//! - **Memory**: in-process backends for both contracts
//! - **Error**: closed error taxonomy shared by every component
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use inkwell_core::memory::MemoryStore;
//! use inkwell_core::session::SessionDirectory;
//! use inkwell_core::token::{TokenCodec, TokenConfig};
//! use inkwell_core::types::SubjectId;
//!
//! let codec = Arc::new(TokenCodec::new(TokenConfig::new("a-long-enough-secret-for-hmac-signing"))?);
//! let sessions = SessionDirectory::new(Arc::new(MemoryStore::new()), codec.clone());
//!
//! let credential = codec.issue(SubjectId::new(42))?;
//! sessions.register(&credential, SubjectId::new(42), sessions.default_ttl()).await?;
//! assert_eq!(sessions.validate(&credential).await?, SubjectId::new(42));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod error;
pub mod types;

// =============================================================================
// Authentication Modules
// =============================================================================

pub mod token;
pub mod kv;
pub mod session;

// =============================================================================
// Persistence Modules
// =============================================================================

pub mod database;
pub mod unit_of_work;

// =============================================================================
// Backends
// =============================================================================

pub mod memory;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{
    AuthError, CoreError, CoreResult, ErrorKind, SessionError, StoreError, TokenError,
    TransactionError,
};
pub use types::{Credential, SubjectId};
pub use token::{Claims, TokenCodec, TokenConfig};
pub use kv::KeyValueStore;
pub use session::SessionDirectory;
pub use database::{Database, Transaction};
pub use unit_of_work::{TxScope, UnitOfWork};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
