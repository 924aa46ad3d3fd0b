//! Token issuance and verification.
//!
//! This module provides:
//! - Claims and token classes
//! - Duration-spec expiry policy
//! - The per-class signing keyring
//! - Compact token encoding, verification and unverified peeking
//! - The issuer, verifier and rotating token service

pub mod claims;
pub mod codec;
pub mod expiry;
pub mod issuer;
pub mod keyring;
pub mod service;
pub mod verifier;

pub use claims::{Claims, RefreshClaims, TokenClass};
pub use codec::{ClaimsCodec, UnverifiedToken, VerifiedToken};
pub use expiry::{DurationSpec, DurationUnit, compute_expiry};
pub use issuer::{IssuedToken, TokenIssuer, TokenPair};
pub use keyring::{SigningAlgorithm, SigningKey, SigningKeyConfig, SigningKeyring, SigningSecret};
pub use service::TokenService;
pub use verifier::TokenVerifier;
