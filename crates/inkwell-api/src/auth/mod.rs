// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication module.
//!
//! This module provides:
//! - The authentication gate composing credential verification and session lookup
//! - The identity attached to authenticated requests

mod gate;
mod identity;

pub use gate::{parse_bearer, AuthGate};
pub use identity::Identity;
