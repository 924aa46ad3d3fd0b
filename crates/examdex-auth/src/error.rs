//! Token engine error types.
//!
//! Every failure the engine can produce is a [`TokenError`]. Configuration
//! and duration errors surface at startup; the token errors are recoverable
//! and handed back to the caller, who decides what the user sees.
//!
//! Error messages never contain secrets or token text.

use std::fmt;

use crate::token::TokenClass;

/// Errors produced while configuring, issuing or verifying tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The keyring configuration is missing or invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// An expiry duration spec could not be parsed.
    #[error("Invalid duration '{spec}': {reason}")]
    InvalidDuration {
        /// The rejected spec.
        spec: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The token is structurally invalid.
    #[error("Malformed token: {message}")]
    MalformedToken {
        /// Description of the structural problem.
        message: String,
    },

    /// The token signature does not match the key it was checked against.
    #[error("Invalid token signature")]
    SignatureInvalid,

    /// The token has expired. Produced by the codec, which does not know
    /// which class it is decoding.
    #[error("Token expired")]
    TokenExpired,

    /// The access token has expired.
    #[error("Access token expired")]
    AccessTokenExpired,

    /// The refresh token has expired.
    #[error("Refresh token expired")]
    RefreshTokenExpired,

    /// The claims could not be signed.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the signing failure.
        message: String,
    },

    /// The principal behind a refresh token was rejected during rotation.
    #[error("Principal rejected: {message}")]
    PrincipalRejected {
        /// Description of why the principal was rejected.
        message: String,
    },
}

impl TokenError {
    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidDuration` error.
    #[must_use]
    pub fn invalid_duration(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDuration {
            spec: spec.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `MalformedToken` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedToken {
            message: message.into(),
        }
    }

    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates a new `PrincipalRejected` error.
    #[must_use]
    pub fn principal_rejected(message: impl Into<String>) -> Self {
        Self::PrincipalRejected {
            message: message.into(),
        }
    }

    /// Qualifies a codec-level expiry with the class that was being verified.
    ///
    /// Other errors are returned unchanged.
    #[must_use]
    pub fn for_class(self, class: TokenClass) -> Self {
        match (self, class) {
            (Self::TokenExpired, TokenClass::Access) => Self::AccessTokenExpired,
            (Self::TokenExpired, TokenClass::Refresh) => Self::RefreshTokenExpired,
            (other, _) => other,
        }
    }

    /// Returns `true` for errors that should stop the process at startup.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::InvalidDuration { .. })
    }

    /// Returns `true` if the token was authentic but past its expiry.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(
            self,
            Self::TokenExpired | Self::AccessTokenExpired | Self::RefreshTokenExpired
        )
    }

    /// Returns `true` if the caller may try a silent refresh-token rotation.
    #[must_use]
    pub fn should_attempt_refresh(&self) -> bool {
        matches!(self, Self::AccessTokenExpired)
    }

    /// Returns `true` if the caller must send the principal back to login.
    #[must_use]
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            Self::RefreshTokenExpired
                | Self::MalformedToken { .. }
                | Self::SignatureInvalid
                | Self::PrincipalRejected { .. }
        )
    }

    /// Returns the error category for logging.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration { .. } | Self::InvalidDuration { .. } => {
                ErrorCategory::Configuration
            }
            Self::MalformedToken { .. } | Self::SignatureInvalid => ErrorCategory::Validation,
            Self::TokenExpired | Self::AccessTokenExpired | Self::RefreshTokenExpired => {
                ErrorCategory::Expiry
            }
            Self::PrincipalRejected { .. } => ErrorCategory::Authentication,
            Self::Encoding { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of token errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Startup configuration errors.
    Configuration,
    /// The token failed structural or signature validation.
    Validation,
    /// The token was authentic but expired.
    Expiry,
    /// The principal was rejected.
    Authentication,
    /// Unexpected internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Validation => write!(f, "validation"),
            Self::Expiry => write!(f, "expiry"),
            Self::Authentication => write!(f, "authentication"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
