//! # examdex-auth
//!
//! Access/refresh token engine for the ExamDex platform.
//!
//! This crate provides:
//! - HMAC-signed bearer tokens in the compact JWT format
//! - Separate keys and lifetimes for access and refresh tokens
//! - Minimized refresh-token payloads
//! - Typed, class-qualified verification errors
//! - Refresh-token rotation
//! - Argon2 password hashing behind a trait
//!
//! ## Modules
//!
//! - [`config`] - Signing configuration and its loader
//! - [`token`] - Keyring, expiry policy, codec, issuer and verifier
//! - [`principal`] - The principal proven by an access token
//! - [`bearer`] - Bearer credential extraction
//! - [`hash`] - Password hashing
//! - [`error`] - Error taxonomy
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use examdex_auth::config::loader::load_config;
//! use examdex_auth::token::{Claims, SigningKeyring, TokenService};
//!
//! let keyring = SigningKeyring::from_config(&load_config(None)?)?;
//! let service = TokenService::new(Arc::new(keyring));
//!
//! let claims = Claims::new("u1", "a@b.com", "student").with_role("learner");
//! let pair = service.issue_for(&claims)?;
//! let principal = service.authenticate(&pair.access_token)?;
//! ```

pub mod bearer;
pub mod config;
pub mod error;
pub mod hash;
pub mod principal;
pub mod token;

pub use config::{ConfigError, TokenConfig};
pub use error::{ErrorCategory, TokenError};
pub use hash::{Argon2HashService, HashError, HashService};
pub use principal::AuthenticatedPrincipal;
pub use token::{
    Claims, ClaimsCodec, DurationSpec, IssuedToken, RefreshClaims, SigningAlgorithm,
    SigningKeyConfig, SigningKeyring, TokenClass, TokenIssuer, TokenPair, TokenService,
    TokenVerifier, UnverifiedToken, VerifiedToken, compute_expiry,
};
