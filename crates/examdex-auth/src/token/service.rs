//! Token service: issuance, authentication and refresh rotation over one
//! keyring.
//!
//! # Usage
//!
//! ```ignore
//! use examdex_auth::token::{SigningKeyring, TokenService};
//!
//! let keyring = SigningKeyring::from_config(&config)?;
//! let service = TokenService::new(Arc::new(keyring));
//!
//! let pair = service.issue_for(&claims)?;
//! let principal = service.authenticate(&pair.access_token)?;
//! let rotated = service.rotate(&pair.refresh_token, |refresh| users.claims_for(refresh))?;
//! ```

use std::sync::Arc;

use crate::error::TokenError;
use crate::principal::AuthenticatedPrincipal;
use crate::token::claims::{Claims, RefreshClaims};
use crate::token::issuer::{TokenIssuer, TokenPair, now};
use crate::token::keyring::SigningKeyring;
use crate::token::verifier::TokenVerifier;

/// Issuer and verifier sharing one keyring.
#[derive(Debug, Clone)]
pub struct TokenService {
    issuer: TokenIssuer,
    verifier: TokenVerifier,
}

impl TokenService {
    /// Creates a service over `keyring`.
    #[must_use]
    pub fn new(keyring: Arc<SigningKeyring>) -> Self {
        Self {
            issuer: TokenIssuer::new(Arc::clone(&keyring)),
            verifier: TokenVerifier::new(keyring),
        }
    }

    /// The underlying issuer.
    #[must_use]
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// The underlying verifier.
    #[must_use]
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Issues a token pair for a principal whose credentials were checked.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] if signing fails.
    pub fn issue_for(&self, claims: &Claims) -> Result<TokenPair, TokenError> {
        self.issuer.issue_token_pair(claims)
    }

    /// Verifies an access token and returns the principal it represents.
    ///
    /// # Errors
    ///
    /// Returns the verifier's errors unchanged.
    pub fn authenticate(&self, access_token: &str) -> Result<AuthenticatedPrincipal, TokenError> {
        self.verifier
            .verify_access_token(access_token)
            .map(AuthenticatedPrincipal::from)
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// See [`TokenService::rotate_at`].
    ///
    /// # Errors
    ///
    /// See [`TokenService::rotate_at`].
    pub fn rotate<F>(&self, refresh_token: &str, resolve: F) -> Result<TokenPair, TokenError>
    where
        F: FnOnce(&RefreshClaims) -> Result<Claims, TokenError>,
    {
        self.rotate_at(refresh_token, now(), resolve)
    }

    /// Exchanges a refresh token for a new pair as of `now`.
    ///
    /// `resolve` receives the verified refresh claims and returns the
    /// principal's current full claims, typically reloaded from storage. It
    /// should return [`TokenError::PrincipalRejected`] for unknown or
    /// inactive principals. Revoking the presented refresh token is left to
    /// the caller.
    ///
    /// # Errors
    ///
    /// Returns the verifier's errors, the resolver's error, or
    /// [`TokenError::PrincipalRejected`] if the resolved claims belong to a
    /// different subject.
    pub fn rotate_at<F>(
        &self,
        refresh_token: &str,
        now: i64,
        resolve: F,
    ) -> Result<TokenPair, TokenError>
    where
        F: FnOnce(&RefreshClaims) -> Result<Claims, TokenError>,
    {
        let verified = self.verifier.verify_refresh_token_at(refresh_token, now)?;
        let refresh = verified.claims();

        let claims = resolve(refresh)?;
        if claims.subject_id != refresh.subject_id {
            tracing::warn!(
                expected = %refresh.subject_id,
                resolved = %claims.subject_id,
                "Resolved principal does not match refresh token subject"
            );
            return Err(TokenError::principal_rejected(
                "resolved principal does not match refresh token subject",
            ));
        }

        let pair = self.issuer.issue_token_pair_at(&claims, now)?;
        tracing::info!(subject_id = %claims.subject_id, "Rotated token pair");
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::keyring::SigningKeyConfig;

    const NOW: i64 = 1_700_000_000;

    fn service() -> TokenService {
        let keyring = SigningKeyring::new(
            SigningKeyConfig::new("service-access-secret-0123456789ab", "15m").unwrap(),
            SigningKeyConfig::new("service-refresh-secret-0123456789a", "7d").unwrap(),
        )
        .unwrap();
        TokenService::new(Arc::new(keyring))
    }

    fn claims() -> Claims {
        Claims::new("u1", "a@b.com", "student").with_role("learner")
    }

    #[test]
    fn test_authenticate_returns_principal() {
        let service = service();
        let pair = service.issue_for(&claims()).unwrap();
        let principal = service.authenticate(&pair.access_token).unwrap();
        assert_eq!(principal.id, "u1");
        assert_eq!(principal.principal_type, "student");
        assert!(principal.has_role("learner"));
    }

    #[test]
    fn test_authenticate_rejects_refresh_token() {
        let service = service();
        let pair = service.issue_for(&claims()).unwrap();
        assert_eq!(
            service.authenticate(&pair.refresh_token).unwrap_err(),
            TokenError::SignatureInvalid
        );
    }

    #[test]
    fn test_rotate_reloads_principal() {
        let service = service();
        let pair = service.issuer().issue_token_pair_at(&claims(), NOW).unwrap();

        let rotated = service
            .rotate_at(&pair.refresh_token, NOW + 3_600, |refresh| {
                assert_eq!(refresh.subject_id, "u1");
                Ok(Claims::new("u1", "a@b.com", "student").with_role("mentor"))
            })
            .unwrap();

        assert_eq!(rotated.issued_at, NOW + 3_600);
        let verified = service
            .verifier()
            .verify_access_token_at(&rotated.access_token, NOW + 3_600)
            .unwrap();
        assert!(verified.claims().roles.contains("mentor"));
    }

    #[test]
    fn test_rotate_propagates_resolver_rejection() {
        let service = service();
        let pair = service.issuer().issue_token_pair_at(&claims(), NOW).unwrap();
        let err = service
            .rotate_at(&pair.refresh_token, NOW, |_| {
                Err(TokenError::principal_rejected("account is inactive"))
            })
            .unwrap_err();
        assert!(err.requires_reauthentication());
        assert!(err.to_string().contains("inactive"));
    }

    #[test]
    fn test_rotate_rejects_subject_mismatch() {
        let service = service();
        let pair = service.issuer().issue_token_pair_at(&claims(), NOW).unwrap();
        let err = service
            .rotate_at(&pair.refresh_token, NOW, |_| {
                Ok(Claims::new("u2", "other@b.com", "admin"))
            })
            .unwrap_err();
        assert!(matches!(err, TokenError::PrincipalRejected { .. }));
    }

    #[test]
    fn test_rotate_with_expired_refresh_token() {
        let service = service();
        let pair = service.issuer().issue_token_pair_at(&claims(), NOW).unwrap();
        let mut called = false;
        let err = service
            .rotate_at(&pair.refresh_token, NOW + 604_800, |_| {
                called = true;
                Ok(claims())
            })
            .unwrap_err();
        assert_eq!(err, TokenError::RefreshTokenExpired);
        assert!(!called);
    }

    #[test]
    fn test_rotate_rejects_access_token() {
        let service = service();
        let pair = service.issuer().issue_token_pair_at(&claims(), NOW).unwrap();
        let err = service
            .rotate_at(&pair.access_token, NOW, |_| Ok(claims()))
            .unwrap_err();
        assert_eq!(err, TokenError::SignatureInvalid);
    }
}
