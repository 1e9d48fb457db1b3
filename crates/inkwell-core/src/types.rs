// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Shared identifier and credential types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// SubjectId
// =============================================================================

/// Identifier of an authenticated user.
///
/// Serialized as a bare JSON number and stored as a decimal string in the
/// session directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(u64);

impl SubjectId {
    /// Creates a new subject identifier.
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubjectId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

impl From<u64> for SubjectId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// =============================================================================
// Credential
// =============================================================================

/// Opaque bearer string presented by a client.
///
/// The `Debug` output never reveals the token itself.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the credential, returning the raw token string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"[REDACTED]").finish()
    }
}

impl AsRef<str> for Credential {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_id_parse_and_display() {
        let id: SubjectId = "42".parse().unwrap();
        assert_eq!(id, SubjectId::new(42));
        assert_eq!(id.to_string(), "42");
        assert!("forty-two".parse::<SubjectId>().is_err());
    }

    #[test]
    fn test_subject_id_serializes_as_number() {
        let json = serde_json::to_string(&SubjectId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("secret.token.value");
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("secret"));
        assert_eq!(credential.as_str(), "secret.token.value");
    }
}
