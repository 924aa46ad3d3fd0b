//! Signing keys for the two token classes.
//!
//! The [`SigningKeyring`] holds one HMAC key per [`TokenClass`]. It is
//! validated completely when it is built, so a missing or unusable secret
//! stops the process at startup instead of failing the first request.
//! Once built it is immutable and can be shared through an `Arc`.

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};

use crate::config::TokenConfig;
use crate::error::TokenError;
use crate::token::claims::TokenClass;
use crate::token::expiry::DurationSpec;

/// Secrets shorter than this still work but are logged as weak.
pub const RECOMMENDED_SECRET_BYTES: usize = 32;

// ============================================================================
// Signing Algorithm
// ============================================================================

/// HMAC algorithms supported for signing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256.
    #[default]
    HS256,
    /// HMAC with SHA-384.
    HS384,
    /// HMAC with SHA-512.
    HS512,
}

impl SigningAlgorithm {
    /// Converts to the `jsonwebtoken` Algorithm type.
    #[must_use]
    pub fn to_jwt_algorithm(self) -> Algorithm {
        match self {
            Self::HS256 => Algorithm::HS256,
            Self::HS384 => Algorithm::HS384,
            Self::HS512 => Algorithm::HS512,
        }
    }

    /// Returns the algorithm name as used in JWT headers.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Secrets and per-class configuration
// ============================================================================

/// A signing secret. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(String);

impl SigningSecret {
    /// Wraps a secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret([REDACTED])")
    }
}

impl From<&str> for SigningSecret {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl From<String> for SigningSecret {
    fn from(secret: String) -> Self {
        Self(secret)
    }
}

/// Secret, lifetime and algorithm for one token class.
#[derive(Debug, Clone)]
pub struct SigningKeyConfig {
    /// HMAC secret.
    pub secret: SigningSecret,

    /// Token lifetime.
    pub expires_in: DurationSpec,

    /// Signing algorithm.
    pub algorithm: SigningAlgorithm,
}

impl SigningKeyConfig {
    /// Creates a config using the default algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidDuration`] if `expires_in` is malformed.
    pub fn new(secret: impl Into<SigningSecret>, expires_in: &str) -> Result<Self, TokenError> {
        Ok(Self {
            secret: secret.into(),
            expires_in: DurationSpec::parse(expires_in)?,
            algorithm: SigningAlgorithm::default(),
        })
    }

    /// Sets the signing algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: SigningAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

// ============================================================================
// Signing keys
// ============================================================================

/// A ready-to-use key for one token class.
pub struct SigningKey {
    class: TokenClass,
    algorithm: SigningAlgorithm,
    expires_in: DurationSpec,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SigningKey {
    fn from_config(class: TokenClass, config: &SigningKeyConfig) -> Result<Self, TokenError> {
        if config.secret.is_blank() {
            return Err(TokenError::configuration(format!(
                "{class} token secret is empty"
            )));
        }
        if config.secret.len() < RECOMMENDED_SECRET_BYTES {
            tracing::warn!(
                class = %class,
                length = config.secret.len(),
                recommended = RECOMMENDED_SECRET_BYTES,
                "Signing secret is shorter than recommended"
            );
        }

        Ok(Self {
            class,
            algorithm: config.algorithm,
            expires_in: config.expires_in,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        })
    }

    /// The class this key signs.
    #[must_use]
    pub fn class(&self) -> TokenClass {
        self.class
    }

    /// The signing algorithm.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// The lifetime of tokens signed with this key.
    #[must_use]
    pub fn expires_in(&self) -> DurationSpec {
        self.expires_in
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("class", &self.class)
            .field("algorithm", &self.algorithm)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Keyring
// ============================================================================

/// One signing key per token class.
#[derive(Debug)]
pub struct SigningKeyring {
    access: SigningKey,
    refresh: SigningKey,
}

impl SigningKeyring {
    /// Builds a keyring from per-class configs.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Configuration`] if a secret is blank or both
    /// classes share the same secret.
    pub fn new(access: SigningKeyConfig, refresh: SigningKeyConfig) -> Result<Self, TokenError> {
        if access.secret == refresh.secret {
            return Err(TokenError::configuration(
                "access and refresh token secrets must differ",
            ));
        }

        let keyring = Self {
            access: SigningKey::from_config(TokenClass::Access, &access)?,
            refresh: SigningKey::from_config(TokenClass::Refresh, &refresh)?,
        };

        tracing::info!(
            access_algorithm = %keyring.access.algorithm,
            access_expires_in = %keyring.access.expires_in,
            refresh_algorithm = %keyring.refresh.algorithm,
            refresh_expires_in = %keyring.refresh.expires_in,
            "Signing keyring initialized"
        );

        Ok(keyring)
    }

    /// Builds a keyring from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Configuration`] if any of the four required
    /// options is missing, and [`TokenError::InvalidDuration`] if a lifetime
    /// is malformed.
    pub fn from_config(config: &TokenConfig) -> Result<Self, TokenError> {
        let access_secret = required(&config.access_token_secret, "access_token_secret")?;
        let refresh_secret = required(&config.refresh_token_secret, "refresh_token_secret")?;
        let access_expires = required(&config.access_token_expires_in, "access_token_expires_in")?;
        let refresh_expires =
            required(&config.refresh_token_expires_in, "refresh_token_expires_in")?;

        Self::new(
            SigningKeyConfig::new(access_secret, access_expires)?.with_algorithm(config.algorithm),
            SigningKeyConfig::new(refresh_secret, refresh_expires)?
                .with_algorithm(config.algorithm),
        )
    }

    /// Returns the key for a token class.
    #[must_use]
    pub fn key_for(&self, class: TokenClass) -> &SigningKey {
        match class {
            TokenClass::Access => &self.access,
            TokenClass::Refresh => &self.refresh,
        }
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, TokenError> {
    value
        .as_deref()
        .ok_or_else(|| TokenError::configuration(format!("{name} is not set")))
}
