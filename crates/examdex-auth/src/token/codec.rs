//! Compact token encoding and decoding.
//!
//! Tokens use the compact JWS form expected by `Authorization: Bearer`
//! clients: `base64url(header).base64url(payload).base64url(signature)`.
//! The payload is the class's claims with `iat` and `exp` alongside.
//!
//! [`ClaimsCodec::decode`] checks the signature before anything in the
//! payload is looked at, then the expiry. [`ClaimsCodec::peek`] skips the
//! signature and returns an [`UnverifiedToken`], a separate type that the
//! rest of the crate never accepts as proof of identity.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::TokenError;
use crate::token::claims::TokenClass;
use crate::token::keyring::SigningKey;

#[derive(Serialize)]
struct EnvelopeRef<'a, C> {
    #[serde(flatten)]
    claims: &'a C,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct Envelope<C> {
    #[serde(flatten)]
    claims: C,
    iat: i64,
    exp: i64,
}

// ============================================================================
// Verified tokens
// ============================================================================

/// Claims whose signature and expiry have been checked.
///
/// Only the codec can construct this type, so holding one means the token
/// was authentic and unexpired at verification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedToken<C> {
    class: TokenClass,
    claims: C,
    issued_at: i64,
    expires_at: i64,
}

impl<C> VerifiedToken<C> {
    /// The class whose key verified this token.
    #[must_use]
    pub fn class(&self) -> TokenClass {
        self.class
    }

    /// The verified claims.
    #[must_use]
    pub fn claims(&self) -> &C {
        &self.claims
    }

    /// Consumes the token, returning the claims.
    #[must_use]
    pub fn into_claims(self) -> C {
        self.claims
    }

    /// Issued-at (Unix seconds).
    #[must_use]
    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    /// Expiry (Unix seconds).
    #[must_use]
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }
}

// ============================================================================
// Unverified tokens
// ============================================================================

/// Header and payload of a token read without checking its signature.
///
/// Anyone can mint a token that peeks cleanly. Use this for logs and UI
/// hints only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnverifiedToken {
    /// `alg` header value.
    pub algorithm: Option<String>,
    /// `subjectId` claim.
    pub subject_id: Option<String>,
    /// `email` claim.
    pub email: Option<String>,
    /// `principalType` claim.
    pub principal_type: Option<String>,
    /// `roles` claim.
    pub roles: Option<Vec<String>>,
    /// `iat` claim.
    pub issued_at: Option<i64>,
    /// `exp` claim.
    pub expires_at: Option<i64>,
}

impl UnverifiedToken {
    /// Whether the embedded `exp` has passed. A missing `exp` counts as
    /// expired.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_none_or(|exp| now >= exp)
    }
}

#[derive(Deserialize)]
struct PeekHeader {
    alg: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeekPayload {
    subject_id: Option<String>,
    email: Option<String>,
    principal_type: Option<String>,
    roles: Option<Vec<String>>,
    iat: Option<i64>,
    exp: Option<i64>,
}

// ============================================================================
// Codec
// ============================================================================

/// Encodes and decodes signed tokens.
pub struct ClaimsCodec;

impl ClaimsCodec {
    /// Signs `claims` with `key`, adding `iat` and `exp`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] if `expires_at` precedes `issued_at`
    /// or the claims cannot be serialized.
    pub fn encode<C: Serialize>(
        claims: &C,
        key: &SigningKey,
        issued_at: i64,
        expires_at: i64,
    ) -> Result<String, TokenError> {
        if expires_at < issued_at {
            return Err(TokenError::encoding("expiry precedes issuance"));
        }

        let header = Header::new(key.algorithm().to_jwt_algorithm());
        let envelope = EnvelopeRef {
            claims,
            iat: issued_at,
            exp: expires_at,
        };

        jsonwebtoken::encode(&header, &envelope, key.encoding_key())
            .map_err(|e| TokenError::encoding(e.to_string()))
    }

    /// Verifies `token` against `key` and returns its claims.
    ///
    /// The token is expired when `now >= exp`.
    ///
    /// # Errors
    ///
    /// - [`TokenError::MalformedToken`] if the token is structurally invalid
    ///   or lacks `iat`/`exp`
    /// - [`TokenError::SignatureInvalid`] if the signature does not match
    ///   `key`, or the header names a different algorithm
    /// - [`TokenError::TokenExpired`] if the token is authentic but expired
    pub fn decode<C: DeserializeOwned>(
        token: &str,
        key: &SigningKey,
        now: i64,
    ) -> Result<VerifiedToken<C>, TokenError> {
        let mut validation = Validation::new(key.algorithm().to_jwt_algorithm());
        validation.validate_exp = false; // Checked below against the caller's clock
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<Envelope<C>>(token, key.decoding_key(), &validation)
            .map_err(map_jwt_error)?;
        let Envelope { claims, iat, exp } = data.claims;

        if now >= exp {
            return Err(TokenError::TokenExpired);
        }

        Ok(VerifiedToken {
            class: key.class(),
            claims,
            issued_at: iat,
            expires_at: exp,
        })
    }

    /// Reads header and payload without verifying the signature.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MalformedToken`] if the token does not have
    /// three segments or the header/payload are not base64url JSON objects.
    pub fn peek(token: &str) -> Result<UnverifiedToken, TokenError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::malformed("expected three dot-separated segments"));
        };

        let header: PeekHeader = decode_segment(header, "header")?;
        let payload: PeekPayload = decode_segment(payload, "payload")?;

        Ok(UnverifiedToken {
            algorithm: header.alg,
            subject_id: payload.subject_id,
            email: payload.email,
            principal_type: payload.principal_type,
            roles: payload.roles,
            issued_at: payload.iat,
            expires_at: payload.exp,
        })
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str, name: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::malformed(format!("{name} is not valid base64url")))?;
    serde_json::from_slice(&bytes)
        .map_err(|_| TokenError::malformed(format!("{name} is not a valid JSON object")))
}

/// Maps library errors to fixed messages so no token content leaks into
/// error text.
fn map_jwt_error(err: jsonwebtoken::errors::Error) -> TokenError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::SignatureInvalid,
        ErrorKind::ExpiredSignature => TokenError::TokenExpired,
        ErrorKind::InvalidToken => {
            TokenError::malformed("expected three dot-separated segments")
        }
        ErrorKind::Base64(_) => TokenError::malformed("segment is not valid base64url"),
        ErrorKind::Utf8(_) => TokenError::malformed("segment is not valid UTF-8"),
        ErrorKind::Json(_) => TokenError::malformed("header or claims are not valid JSON"),
        ErrorKind::InvalidAlgorithmName | ErrorKind::MissingAlgorithm => {
            TokenError::malformed("unsupported signing algorithm")
        }
        _ => TokenError::malformed("token could not be decoded"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::claims::{Claims, RefreshClaims};
    use crate::token::keyring::{SigningAlgorithm, SigningKeyConfig, SigningKeyring};

    const NOW: i64 = 1_700_000_000;

    fn keyring() -> SigningKeyring {
        SigningKeyring::new(
            SigningKeyConfig::new("codec-access-secret-0123456789abcd", "15m").unwrap(),
            SigningKeyConfig::new("codec-refresh-secret-0123456789abc", "7d").unwrap(),
        )
        .unwrap()
    }

    fn claims() -> Claims {
        Claims::new("u1", "a@b.com", "student").with_role("learner")
    }

    #[test]
    fn test_encode_produces_three_segments() {
        let keyring = keyring();
        let key = keyring.key_for(TokenClass::Access);
        let token = ClaimsCodec::encode(&claims(), key, NOW, NOW + 900).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, jsonwebtoken::Algorithm::HS256);
        assert_eq!(header.typ.as_deref(), Some("JWT"));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let keyring = keyring();
        let key = keyring.key_for(TokenClass::Access);
        let token = ClaimsCodec::encode(&claims(), key, NOW, NOW + 900).unwrap();

        let verified = ClaimsCodec::decode::<Claims>(&token, key, NOW + 1).unwrap();
        assert_eq!(verified.claims(), &claims());
        assert_eq!(verified.class(), TokenClass::Access);
        assert_eq!(verified.issued_at(), NOW);
        assert_eq!(verified.expires_at(), NOW + 900);
    }

    #[test]
    fn test_expiry_boundary() {
        let keyring = keyring();
        let key = keyring.key_for(TokenClass::Access);
        let token = ClaimsCodec::encode(&claims(), key, NOW, NOW + 900).unwrap();

        assert!(ClaimsCodec::decode::<Claims>(&token, key, NOW + 899).is_ok());
        assert_eq!(
            ClaimsCodec::decode::<Claims>(&token, key, NOW + 900).unwrap_err(),
            TokenError::TokenExpired
        );
    }

    #[test]
    fn test_wrong_key_is_signature_invalid() {
        let keyring = keyring();
        let token =
            ClaimsCodec::encode(&claims(), keyring.key_for(TokenClass::Access), NOW, NOW + 900)
                .unwrap();
        let err = ClaimsCodec::decode::<Claims>(&token, keyring.key_for(TokenClass::Refresh), NOW)
            .unwrap_err();
        assert_eq!(err, TokenError::SignatureInvalid);
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        let keyring = keyring();
        let token =
            ClaimsCodec::encode(&claims(), keyring.key_for(TokenClass::Access), NOW, NOW).unwrap();
        let err = ClaimsCodec::decode::<Claims>(
            &token,
            keyring.key_for(TokenClass::Refresh),
            NOW + 10_000,
        )
        .unwrap_err();
        assert_eq!(err, TokenError::SignatureInvalid);
    }

    #[test]
    fn test_algorithm_mismatch_is_signature_invalid() {
        let strong = SigningKeyring::new(
            SigningKeyConfig::new("codec-access-secret-0123456789abcd", "15m")
                .unwrap()
                .with_algorithm(SigningAlgorithm::HS512),
            SigningKeyConfig::new("codec-refresh-secret-0123456789abc", "7d").unwrap(),
        )
        .unwrap();
        let token =
            ClaimsCodec::encode(&claims(), strong.key_for(TokenClass::Access), NOW, NOW + 900)
                .unwrap();

        let err =
            ClaimsCodec::decode::<Claims>(&token, keyring().key_for(TokenClass::Access), NOW)
                .unwrap_err();
        assert_eq!(err, TokenError::SignatureInvalid);
    }

    #[test]
    fn test_structurally_invalid_tokens_are_malformed() {
        let keyring = keyring();
        let key = keyring.key_for(TokenClass::Access);
        for token in ["", "abc", "a.b", "a.b.c.d", "!!!.???.***"] {
            let err = ClaimsCodec::decode::<Claims>(token, key, NOW).unwrap_err();
            assert!(
                matches!(err, TokenError::MalformedToken { .. }),
                "token {token:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_decode_ignores_extra_claims_for_minimized_payload() {
        let keyring = keyring();
        let key = keyring.key_for(TokenClass::Refresh);
        let token = ClaimsCodec::encode(&claims(), key, NOW, NOW + 60).unwrap();
        let verified = ClaimsCodec::decode::<RefreshClaims>(&token, key, NOW).unwrap();
        assert_eq!(verified.claims().subject_id, "u1");
    }

    #[test]
    fn test_encode_rejects_expiry_before_issuance() {
        let keyring = keyring();
        let err = ClaimsCodec::encode(&claims(), keyring.key_for(TokenClass::Access), NOW, NOW - 1)
            .unwrap_err();
        assert!(matches!(err, TokenError::Encoding { .. }));
    }

    #[test]
    fn test_peek_reads_without_key() {
        let keyring = keyring();
        let token =
            ClaimsCodec::encode(&claims(), keyring.key_for(TokenClass::Access), NOW, NOW + 900)
                .unwrap();

        let peeked = ClaimsCodec::peek(&token).unwrap();
        assert_eq!(peeked.algorithm.as_deref(), Some("HS256"));
        assert_eq!(peeked.subject_id.as_deref(), Some("u1"));
        assert_eq!(peeked.principal_type.as_deref(), Some("student"));
        assert_eq!(peeked.roles, Some(vec!["learner".to_string()]));
        assert_eq!(peeked.issued_at, Some(NOW));
        assert_eq!(peeked.expires_at, Some(NOW + 900));
        assert!(!peeked.is_expired_at(NOW));
        assert!(peeked.is_expired_at(NOW + 900));
    }

    #[test]
    fn test_peek_rejects_garbage() {
        assert!(matches!(
            ClaimsCodec::peek("not-a-token").unwrap_err(),
            TokenError::MalformedToken { .. }
        ));
        assert!(matches!(
            ClaimsCodec::peek("***.***.***").unwrap_err(),
            TokenError::MalformedToken { .. }
        ));

        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
        let payload = URL_SAFE_NO_PAD.encode(b"[1,2,3]");
        let token = format!("{header}.{payload}.sig");
        assert!(ClaimsCodec::peek(&token).is_err());
    }

    #[test]
    fn test_unverified_without_exp_counts_as_expired() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"subjectId":"u1"}"#);
        let peeked = ClaimsCodec::peek(&format!("{header}.{payload}.sig")).unwrap();
        assert_eq!(peeked.subject_id.as_deref(), Some("u1"));
        assert!(peeked.is_expired_at(0));
    }
}
