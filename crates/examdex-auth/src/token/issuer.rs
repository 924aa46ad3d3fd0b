//! Token issuance.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::TokenError;
use crate::token::claims::{Claims, RefreshClaims, TokenClass};
use crate::token::codec::ClaimsCodec;
use crate::token::keyring::SigningKeyring;

/// A freshly signed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    /// The compact token string.
    pub token: String,
    /// Class of the token.
    pub class: TokenClass,
    /// Issued-at (Unix seconds).
    pub issued_at: i64,
    /// Expiry (Unix seconds).
    pub expires_at: i64,
}

/// An access and a refresh token issued together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Shared issued-at of both tokens (Unix seconds).
    pub issued_at: i64,
    /// Access token expiry (Unix seconds).
    pub access_token_expires_at: i64,
    /// Refresh token expiry (Unix seconds).
    pub refresh_token_expires_at: i64,
}

/// Builds signed access and refresh tokens.
///
/// This type is `Send + Sync`; clones share the same keyring.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keyring: Arc<SigningKeyring>,
}

impl TokenIssuer {
    /// Creates an issuer over `keyring`.
    #[must_use]
    pub fn new(keyring: Arc<SigningKeyring>) -> Self {
        Self { keyring }
    }

    /// Issues an access token carrying the full claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] if signing fails.
    pub fn issue_access_token(&self, claims: &Claims) -> Result<IssuedToken, TokenError> {
        self.issue_access_token_at(claims, now())
    }

    /// Issues an access token as of `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] if signing fails.
    pub fn issue_access_token_at(
        &self,
        claims: &Claims,
        issued_at: i64,
    ) -> Result<IssuedToken, TokenError> {
        self.sign(TokenClass::Access, claims, &claims.subject_id, issued_at)
    }

    /// Issues a refresh token carrying only the subject and email.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] if signing fails.
    pub fn issue_refresh_token(&self, claims: &Claims) -> Result<IssuedToken, TokenError> {
        self.issue_refresh_token_at(claims, now())
    }

    /// Issues a refresh token as of `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] if signing fails.
    pub fn issue_refresh_token_at(
        &self,
        claims: &Claims,
        issued_at: i64,
    ) -> Result<IssuedToken, TokenError> {
        let minimized = RefreshClaims::from(claims);
        self.sign(TokenClass::Refresh, &minimized, &minimized.subject_id, issued_at)
    }

    /// Issues an access/refresh pair sharing one issued-at instant.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] if signing fails.
    pub fn issue_token_pair(&self, claims: &Claims) -> Result<TokenPair, TokenError> {
        self.issue_token_pair_at(claims, now())
    }

    /// Issues an access/refresh pair as of `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] if signing fails.
    pub fn issue_token_pair_at(
        &self,
        claims: &Claims,
        issued_at: i64,
    ) -> Result<TokenPair, TokenError> {
        let access = self.issue_access_token_at(claims, issued_at)?;
        let refresh = self.issue_refresh_token_at(claims, issued_at)?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            issued_at,
            access_token_expires_at: access.expires_at,
            refresh_token_expires_at: refresh.expires_at,
        })
    }

    fn sign<C: Serialize>(
        &self,
        class: TokenClass,
        payload: &C,
        subject_id: &str,
        issued_at: i64,
    ) -> Result<IssuedToken, TokenError> {
        let key = self.keyring.key_for(class);
        let expires_at = key.expires_in().expires_at(issued_at);
        let token = ClaimsCodec::encode(payload, key, issued_at, expires_at)?;

        tracing::debug!(
            class = %class,
            subject_id,
            issued_at,
            expires_at,
            "Issued token"
        );

        Ok(IssuedToken {
            token,
            class,
            issued_at,
            expires_at,
        })
    }
}

pub(crate) fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::keyring::SigningKeyConfig;

    const NOW: i64 = 1_700_000_000;

    fn issuer() -> TokenIssuer {
        let keyring = SigningKeyring::new(
            SigningKeyConfig::new("issuer-access-secret-0123456789abc", "15m").unwrap(),
            SigningKeyConfig::new("issuer-refresh-secret-0123456789ab", "7d").unwrap(),
        )
        .unwrap();
        TokenIssuer::new(Arc::new(keyring))
    }

    fn claims() -> Claims {
        Claims::new("u1", "a@b.com", "student").with_role("learner")
    }

    #[test]
    fn test_access_token_expiry_from_policy() {
        let token = issuer().issue_access_token_at(&claims(), NOW).unwrap();
        assert_eq!(token.class, TokenClass::Access);
        assert_eq!(token.issued_at, NOW);
        assert_eq!(token.expires_at, NOW + 900);
    }

    #[test]
    fn test_refresh_token_payload_is_minimized() {
        let token = issuer().issue_refresh_token_at(&claims(), NOW).unwrap();
        assert_eq!(token.expires_at, NOW + 604_800);

        let peeked = ClaimsCodec::peek(&token.token).unwrap();
        assert_eq!(peeked.subject_id.as_deref(), Some("u1"));
        assert_eq!(peeked.email.as_deref(), Some("a@b.com"));
        assert!(peeked.principal_type.is_none());
        assert!(peeked.roles.is_none());
    }

    #[test]
    fn test_pair_shares_issued_at() {
        let pair = issuer().issue_token_pair_at(&claims(), NOW).unwrap();
        assert_eq!(pair.issued_at, NOW);
        assert_eq!(pair.access_token_expires_at, NOW + 900);
        assert_eq!(pair.refresh_token_expires_at, NOW + 604_800);

        let access = ClaimsCodec::peek(&pair.access_token).unwrap();
        let refresh = ClaimsCodec::peek(&pair.refresh_token).unwrap();
        assert_eq!(access.issued_at, Some(NOW));
        assert_eq!(refresh.issued_at, Some(NOW));
        assert_ne!(pair.access_token, pair.refresh_token);
    }

    #[test]
    fn test_pair_serializes_camel_case() {
        let pair = issuer().issue_token_pair_at(&claims(), NOW).unwrap();
        let json = serde_json::to_value(&pair).unwrap();
        assert!(json["accessToken"].is_string());
        assert!(json["refreshToken"].is_string());
        assert_eq!(json["accessTokenExpiresAt"], NOW + 900);
    }

    #[test]
    fn test_issue_uses_wall_clock() {
        let before = now();
        let token = issuer().issue_access_token(&claims()).unwrap();
        let after = now();
        assert!(token.issued_at >= before && token.issued_at <= after);
    }
}
