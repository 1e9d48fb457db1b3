// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-process backends for testing and development.
//!
//! - [`MemoryStore`] implements [`KeyValueStore`](crate::kv::KeyValueStore)
//! - [`MemoryDatabase`] implements [`Database`](crate::database::Database)
//!
//! Neither persists anything; both can simulate an outage.

mod database;
mod store;

pub use database::{MemoryDatabase, MemoryTransaction};
pub use store::MemoryStore;
