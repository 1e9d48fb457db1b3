// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Signed bearer credentials.
//!
//! Credentials are HMAC-signed JWTs whose payload is
//! `{"user_id", "iat", "nbf", "exp"}`. The signature is checked before any
//! claim is trusted; the validity window is checked after.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;
use crate::types::{Credential, SubjectId};

/// Secrets shorter than this produce a startup warning.
const RECOMMENDED_SECRET_LEN: usize = 32;

// =============================================================================
// TokenConfig
// =============================================================================

/// Token codec configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Shared HMAC secret.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Validity window applied to every issued credential, in seconds.
    #[serde(with = "duration_secs")]
    pub validity: Duration,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
    /// HMAC algorithm used for signing.
    #[serde(with = "algorithm_serde")]
    pub algorithm: Algorithm,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            validity: Duration::from_secs(3600),
            leeway_secs: 0,
            algorithm: Algorithm::HS256,
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("validity", &self.validity)
            .field("leeway_secs", &self.leeway_secs)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl TokenConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the validity window.
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    /// Sets the clock skew tolerance.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    /// Sets the signing algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::configuration("token secret is not configured"));
        }
        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(TokenError::configuration(format!(
                "unsupported algorithm {:?}, expected an HMAC algorithm",
                self.algorithm
            )));
        }
        if self.validity.is_zero() {
            return Err(TokenError::configuration("token validity must be positive"));
        }
        if i64::try_from(self.validity.as_secs()).is_err() {
            return Err(TokenError::configuration(
                "token validity exceeds the representable expiry range",
            ));
        }
        if self.secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                len = self.secret.len(),
                "Token secret is shorter than recommended (32 bytes)"
            );
        }
        Ok(())
    }
}

// =============================================================================
// Claims
// =============================================================================

/// Decoded payload of a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The user the credential was issued to.
    #[serde(rename = "user_id")]
    pub subject: SubjectId,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Not before (Unix timestamp).
    pub nbf: i64,
    /// Expires at (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Creates claims valid from now for the given window.
    pub fn new(subject: SubjectId, validity: Duration) -> Self {
        let now = Utc::now().timestamp();
        Self {
            subject,
            iat: now,
            nbf: now,
            exp: now.saturating_add(i64::try_from(validity.as_secs()).unwrap_or(i64::MAX)),
        }
    }

    /// Returns the time left until expiry, or zero if already expired.
    pub fn remaining(&self) -> Duration {
        let left = self.exp - Utc::now().timestamp();
        Duration::from_secs(left.max(0) as u64)
    }
}

// =============================================================================
// TokenCodec
// =============================================================================

/// Issues and verifies signed credentials.
///
/// The codec is immutable after construction; changing the secret means
/// building a new codec, which rejects every credential of the old one with
/// [`TokenError::BadSignature`].
#[derive(Clone)]
pub struct TokenCodec {
    algorithm: Algorithm,
    validity: Duration,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
    lenient_validation: Arc<Validation>,
}

impl TokenCodec {
    /// Creates a codec from the given configuration.
    pub fn new(config: TokenConfig) -> Result<Self, TokenError> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = config.leeway_secs;
        validation.required_spec_claims =
            ["exp", "nbf"].iter().map(|c| c.to_string()).collect();

        let mut lenient_validation = Validation::new(config.algorithm);
        lenient_validation.validate_exp = false;
        lenient_validation.validate_nbf = false;
        lenient_validation.validate_aud = false;
        lenient_validation.required_spec_claims = HashSet::new();

        Ok(Self {
            algorithm: config.algorithm,
            validity: config.validity,
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
            lenient_validation: Arc::new(lenient_validation),
        })
    }

    /// Returns the validity window applied to issued credentials.
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issues a credential for the given subject.
    pub fn issue(&self, subject: SubjectId) -> Result<Credential, TokenError> {
        self.encode(&Claims::new(subject, self.validity))
    }

    /// Signs arbitrary claims.
    pub fn encode(&self, claims: &Claims) -> Result<Credential, TokenError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map(Credential::new)
            .map_err(|e| TokenError::encoding(e.to_string()))
    }

    /// Verifies signature and validity window, returning the claims.
    pub fn verify(&self, credential: &Credential) -> Result<Claims, TokenError> {
        decode::<Claims>(credential.as_str(), &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }

    /// Verifies the signature but ignores the validity window.
    ///
    /// Used to resolve the owner of a credential that may already have
    /// expired.
    pub fn decode_ignoring_expiry(&self, credential: &Credential) -> Result<Claims, TokenError> {
        decode::<Claims>(
            credential.as_str(),
            &self.decoding_key,
            &self.lenient_validation,
        )
        .map(|data| data.claims)
        .map_err(map_jwt_error)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        JwtErrorKind::InvalidSignature | JwtErrorKind::InvalidAlgorithm => {
            TokenError::BadSignature
        }
        JwtErrorKind::ExpiredSignature => TokenError::Expired,
        JwtErrorKind::ImmatureSignature => TokenError::NotYetValid,
        _ => TokenError::malformed(error.to_string()),
    }
}

// =============================================================================
// Serialization Helpers
// =============================================================================

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

mod algorithm_serde {
    use jsonwebtoken::Algorithm;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(algorithm: &Algorithm, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match algorithm {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            _ => "unsupported",
        };
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Algorithm, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            _ => Err(serde::de::Error::custom(format!(
                "Unsupported algorithm: {} (expected HS256, HS384 or HS512)",
                s
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough-for-testing";

    fn codec() -> TokenCodec {
        TokenCodec::new(TokenConfig::new(SECRET)).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let codec = codec();
        let credential = codec.issue(SubjectId::new(42)).unwrap();

        let claims = codec.verify(&credential).unwrap();
        assert_eq!(claims.subject, SubjectId::new(42));
        assert_eq!(claims.iat, claims.nbf);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_oversized_validity_saturates_expiry() {
        let claims = Claims::new(SubjectId::new(1), Duration::from_secs(u64::MAX));
        assert_eq!(claims.exp, i64::MAX);
        assert!(claims.remaining() > Duration::from_secs(3600));
    }

    #[test]
    fn test_oversized_validity_is_rejected() {
        let config = TokenConfig::new(SECRET).with_validity(Duration::from_secs(u64::MAX));
        assert!(matches!(
            config.validate(),
            Err(TokenError::Configuration { .. })
        ));
        assert!(TokenCodec::new(config).is_err());
    }

    #[test]
    fn test_validity_is_applied_verbatim() {
        let codec = TokenCodec::new(
            TokenConfig::new(SECRET).with_validity(Duration::from_secs(90)),
        )
        .unwrap();
        let claims = codec.verify(&codec.issue(SubjectId::new(1)).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 90);
    }

    #[test]
    fn test_payload_uses_user_id_field() {
        let claims = Claims::new(SubjectId::new(9), Duration::from_secs(60));
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["user_id"], 9);
        assert!(json.get("subject").is_none());
    }

    #[test]
    fn test_different_secret_is_bad_signature() {
        let credential = codec().issue(SubjectId::new(42)).unwrap();
        let other = TokenCodec::new(TokenConfig::new(
            "another-secret-key-that-is-long-enough-for-tests",
        ))
        .unwrap();

        assert_eq!(other.verify(&credential), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_expired_token() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let credential = codec
            .encode(&Claims {
                subject: SubjectId::new(1),
                iat: now - 7200,
                nbf: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert_eq!(codec.verify(&credential), Err(TokenError::Expired));
        let claims = codec.decode_ignoring_expiry(&credential).unwrap();
        assert_eq!(claims.subject, SubjectId::new(1));
    }

    #[test]
    fn test_not_yet_valid_token() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let credential = codec
            .encode(&Claims {
                subject: SubjectId::new(1),
                iat: now,
                nbf: now + 3600,
                exp: now + 7200,
            })
            .unwrap();

        assert_eq!(codec.verify(&credential), Err(TokenError::NotYetValid));
    }

    #[test]
    fn test_malformed_token() {
        let codec = codec();
        for raw in ["", "abc", "a.b", "not.a.jwt", "!!!.???.###"] {
            let err = codec.verify(&Credential::new(raw)).unwrap_err();
            assert!(
                matches!(err, TokenError::Malformed { .. }),
                "{raw:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_tampered_payload_is_bad_signature() {
        let codec = codec();
        let credential = codec.issue(SubjectId::new(1)).unwrap();
        let forged_payload = codec.issue(SubjectId::new(2)).unwrap();

        let mut parts: Vec<&str> = credential.as_str().split('.').collect();
        let forged: Vec<&str> = forged_payload.as_str().split('.').collect();
        parts[1] = forged[1];
        let tampered = Credential::new(parts.join("."));

        assert_eq!(codec.verify(&tampered), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_algorithm_mismatch_is_bad_signature() {
        let hs512 = TokenCodec::new(TokenConfig::new(SECRET).with_algorithm(Algorithm::HS512))
            .unwrap();
        let credential = hs512.issue(SubjectId::new(1)).unwrap();

        assert_eq!(codec().verify(&credential), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let err = TokenCodec::new(TokenConfig::default()).unwrap_err();
        assert!(matches!(err, TokenError::Configuration { .. }));
    }

    #[test]
    fn test_config_deserialize() {
        let config: TokenConfig = serde_json::from_str(
            r#"{"secret": "s3cr3t", "validity": 120, "algorithm": "HS384"}"#,
        )
        .unwrap();
        assert_eq!(config.validity, Duration::from_secs(120));
        assert_eq!(config.algorithm, Algorithm::HS384);
        assert_eq!(config.leeway_secs, 0);

        let serialized = serde_json::to_value(&config).unwrap();
        assert!(serialized.get("secret").is_none());

        assert!(serde_json::from_str::<TokenConfig>(r#"{"algorithm": "RS256"}"#).is_err());
    }
}
