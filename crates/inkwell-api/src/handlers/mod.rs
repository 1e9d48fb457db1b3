// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers.
//!
//! - [`health`]: store health check
//! - [`session`]: login, logout and profile endpoints

mod health;
mod session;

pub use health::*;
pub use session::*;
