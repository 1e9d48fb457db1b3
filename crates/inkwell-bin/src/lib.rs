// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # inkwell-bin
//!
//! CLI binary for the Inkwell authentication service.
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default command)
//! inkwell
//!
//! # Start with custom config
//! inkwell -c /etc/inkwell/inkwell.yaml
//!
//! # Validate configuration
//! inkwell validate --show-config
//!
//! # Hash a password for a seed account
//! inkwell hash-password 'correct horse battery staple'
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod accounts;
pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{Runtime, RuntimeBuilder};
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
