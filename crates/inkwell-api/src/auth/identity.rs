// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authenticated identity.

use uuid::Uuid;

use inkwell_core::types::{Credential, SubjectId};

/// Identity attached to a request after successful authentication.
///
/// Lives in the request extensions and is read by handlers through the
/// [`Auth`](crate::extractors::Auth) extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The authenticated user.
    pub subject: SubjectId,
    /// The credential the request was authenticated with.
    pub credential: Credential,
    /// Request ID for tracing.
    pub request_id: Uuid,
}

impl Identity {
    /// Creates an identity with a fresh request ID.
    pub fn new(subject: SubjectId, credential: Credential) -> Self {
        Self {
            subject,
            credential,
            request_id: Uuid::now_v7(),
        }
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }
}
