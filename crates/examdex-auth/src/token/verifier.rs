//! Token verification.
//!
//! Each `verify_*` method picks the key for its class from the keyring and
//! decodes with it. An expired token comes back as the class-specific
//! error, so callers can try a silent refresh on
//! [`TokenError::AccessTokenExpired`] and send the user to login on
//! [`TokenError::RefreshTokenExpired`].

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::TokenError;
use crate::token::claims::{Claims, RefreshClaims, TokenClass};
use crate::token::codec::{ClaimsCodec, UnverifiedToken, VerifiedToken};
use crate::token::issuer::now;
use crate::token::keyring::SigningKeyring;

/// Verifies access and refresh tokens.
///
/// This type is `Send + Sync`; clones share the same keyring.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keyring: Arc<SigningKeyring>,
}

impl TokenVerifier {
    /// Creates a verifier over `keyring`.
    #[must_use]
    pub fn new(keyring: Arc<SigningKeyring>) -> Self {
        Self { keyring }
    }

    /// Verifies an access token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MalformedToken`], [`TokenError::SignatureInvalid`]
    /// or [`TokenError::AccessTokenExpired`].
    pub fn verify_access_token(&self, token: &str) -> Result<VerifiedToken<Claims>, TokenError> {
        self.verify_access_token_at(token, now())
    }

    /// Verifies an access token against the instant `now`.
    ///
    /// # Errors
    ///
    /// See [`TokenVerifier::verify_access_token`].
    pub fn verify_access_token_at(
        &self,
        token: &str,
        now: i64,
    ) -> Result<VerifiedToken<Claims>, TokenError> {
        self.verify(TokenClass::Access, token, now)
    }

    /// Verifies a refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MalformedToken`], [`TokenError::SignatureInvalid`]
    /// or [`TokenError::RefreshTokenExpired`].
    pub fn verify_refresh_token(
        &self,
        token: &str,
    ) -> Result<VerifiedToken<RefreshClaims>, TokenError> {
        self.verify_refresh_token_at(token, now())
    }

    /// Verifies a refresh token against the instant `now`.
    ///
    /// # Errors
    ///
    /// See [`TokenVerifier::verify_refresh_token`].
    pub fn verify_refresh_token_at(
        &self,
        token: &str,
        now: i64,
    ) -> Result<VerifiedToken<RefreshClaims>, TokenError> {
        self.verify(TokenClass::Refresh, token, now)
    }

    /// Reports whether a token's `exp` has passed, without checking its
    /// signature.
    ///
    /// Never fails: a token that cannot be read, or has no `exp`, counts as
    /// expired. A forged token can claim any `exp`, so the answer is only a
    /// hint for UI and logs and must never gate access.
    #[must_use]
    pub fn is_expired(&self, token: &str) -> bool {
        self.is_expired_at(token, now())
    }

    /// [`TokenVerifier::is_expired`] against the instant `now`.
    #[must_use]
    pub fn is_expired_at(&self, token: &str, now: i64) -> bool {
        ClaimsCodec::peek(token).map_or(true, |peeked| peeked.is_expired_at(now))
    }

    /// Reads a token without verifying it. See [`ClaimsCodec::peek`].
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MalformedToken`] if the token cannot be read.
    pub fn peek(&self, token: &str) -> Result<UnverifiedToken, TokenError> {
        ClaimsCodec::peek(token)
    }

    fn verify<C: DeserializeOwned>(
        &self,
        class: TokenClass,
        token: &str,
        now: i64,
    ) -> Result<VerifiedToken<C>, TokenError> {
        let key = self.keyring.key_for(class);
        ClaimsCodec::decode(token, key, now).map_err(|err| {
            let err = err.for_class(class);
            tracing::debug!(class = %class, error = %err, "Token verification failed");
            err
        })
    }
}
