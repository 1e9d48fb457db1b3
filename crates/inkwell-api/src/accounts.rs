// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Account lookup collaborator used by the login endpoint.

use async_trait::async_trait;

use inkwell_core::database::Database;
use inkwell_core::types::SubjectId;
use inkwell_core::unit_of_work::TxScope;

use crate::error::ApiResult;

/// Resolves login credentials to a subject.
///
/// Runs inside the login unit of work; implementations read through the
/// transaction carried by `scope`.
#[async_trait]
pub trait AccountDirectory<D: Database>: Send + Sync {
    /// Returns the subject owning `username` if `password` matches.
    ///
    /// Unknown users and wrong passwords both yield `Ok(None)`.
    async fn authenticate(
        &self,
        scope: &TxScope<D::Tx>,
        username: &str,
        password: &str,
    ) -> ApiResult<Option<SubjectId>>;
}
