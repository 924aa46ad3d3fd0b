//! Token engine configuration.
//!
//! All four signing options are required and have no defaults; a missing
//! secret fails startup instead of falling back to a well-known value.
//!
//! # Example (TOML)
//!
//! ```toml
//! access_token_secret = "..."
//! refresh_token_secret = "..."
//! access_token_expires_in = "15m"
//! refresh_token_expires_in = "7d"
//! algorithm = "HS256"
//! ```

use serde::{Deserialize, Serialize};

use crate::token::{DurationSpec, SigningAlgorithm};

/// Signing configuration for both token classes.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Secret for signing access tokens.
    #[serde(skip_serializing)]
    pub access_token_secret: Option<String>,

    /// Secret for signing refresh tokens. Must differ from the access secret.
    #[serde(skip_serializing)]
    pub refresh_token_secret: Option<String>,

    /// Access token lifetime, e.g. `"15m"`.
    pub access_token_expires_in: Option<String>,

    /// Refresh token lifetime, e.g. `"7d"`.
    pub refresh_token_expires_in: Option<String>,

    /// HMAC algorithm for both classes.
    pub algorithm: SigningAlgorithm,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |secret: &Option<String>| secret.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("TokenConfig")
            .field("access_token_secret", &redact(&self.access_token_secret))
            .field("refresh_token_secret", &redact(&self.refresh_token_secret))
            .field("access_token_expires_in", &self.access_token_expires_in)
            .field("refresh_token_expires_in", &self.refresh_token_expires_in)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// The configuration sources could not be read or merged.
    #[error("Failed to load configuration: {0}")]
    Load(String),
}

impl TokenConfig {
    /// Validates the configuration without building keys.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if any of the four signing options is
    /// unset, and `ConfigError::InvalidValue` if:
    /// - a secret is blank
    /// - both secrets are equal
    /// - a lifetime is not a valid duration spec
    pub fn validate(&self) -> Result<(), ConfigError> {
        let access = require(&self.access_token_secret, "access_token_secret")?;
        let refresh = require(&self.refresh_token_secret, "refresh_token_secret")?;
        let access_expires = require(&self.access_token_expires_in, "access_token_expires_in")?;
        let refresh_expires = require(&self.refresh_token_expires_in, "refresh_token_expires_in")?;

        if access.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "access_token_secret cannot be blank".to_string(),
            ));
        }
        if refresh.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "refresh_token_secret cannot be blank".to_string(),
            ));
        }
        if access == refresh {
            return Err(ConfigError::InvalidValue(
                "access_token_secret and refresh_token_secret must differ".to_string(),
            ));
        }

        for (name, spec) in [
            ("access_token_expires_in", access_expires),
            ("refresh_token_expires_in", refresh_expires),
        ] {
            DurationSpec::parse(spec)
                .map_err(|e| ConfigError::InvalidValue(format!("{name}: {e}")))?;
        }

        Ok(())
    }
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .ok_or_else(|| ConfigError::Missing(name.to_string()))
}

pub mod loader {
    //! Layered loading: optional TOML file, then `EXAMDEX_*` environment
    //! variables (e.g. `EXAMDEX_ACCESS_TOKEN_SECRET`).

    use std::path::PathBuf;

    use config::{Config, Environment, File};

    use super::{ConfigError, TokenConfig};

    /// Default file looked up in the working directory.
    pub const DEFAULT_CONFIG_FILE: &str = "examdex.toml";

    /// Environment variable prefix.
    pub const ENV_PREFIX: &str = "EXAMDEX";

    /// Loads and validates configuration.
    ///
    /// `path` names a TOML file; a missing file is skipped. With no path,
    /// [`DEFAULT_CONFIG_FILE`] is used if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a source cannot be parsed, otherwise
    /// the result of [`TokenConfig::validate`].
    pub fn load_config(path: Option<&str>) -> Result<TokenConfig, ConfigError> {
        load_config_with_prefix(path, ENV_PREFIX)
    }

    /// [`load_config`] with a custom environment prefix.
    ///
    /// # Errors
    ///
    /// See [`load_config`].
    pub fn load_config_with_prefix(
        path: Option<&str>,
        env_prefix: &str,
    ) -> Result<TokenConfig, ConfigError> {
        let mut builder = Config::builder();
        let file = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if file.exists() {
            tracing::debug!(path = %file.display(), "Loading token configuration file");
            builder = builder.add_source(File::from(file));
        }
        builder = builder.add_source(Environment::with_prefix(env_prefix));

        let cfg = builder
            .build()
            .map_err(|e| ConfigError::Load(format!("config build error: {e}")))?;
        let merged: TokenConfig = cfg
            .try_deserialize()
            .map_err(|e| ConfigError::Load(format!("config deserialize error: {e}")))?;

        merged.validate()?;
        Ok(merged)
    }
}
