//! The authenticated principal attached to a request.

use std::collections::BTreeSet;

use crate::token::{Claims, VerifiedToken};

/// A principal proven by a verified access token.
///
/// There is no public constructor: the only way to obtain one is from a
/// [`VerifiedToken<Claims>`], so unverified or peeked claims can never be
/// passed where an authenticated principal is expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    /// Stable identifier of the principal.
    pub id: String,

    /// Principal's email address.
    pub email: String,

    /// Role or category of the principal.
    pub principal_type: String,

    /// Roles granted to the principal.
    pub roles: BTreeSet<String>,

    expires_at: i64,
}

impl AuthenticatedPrincipal {
    /// Returns `true` if the principal has a specific role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Returns `true` if the principal has any of the specified roles.
    #[must_use]
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }

    /// Returns `true` if the principal is of the given type.
    #[must_use]
    pub fn is_type(&self, principal_type: &str) -> bool {
        self.principal_type == principal_type
    }

    /// When the access token that proved this principal expires.
    #[must_use]
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }
}

impl From<VerifiedToken<Claims>> for AuthenticatedPrincipal {
    fn from(token: VerifiedToken<Claims>) -> Self {
        let expires_at = token.expires_at();
        let Claims {
            subject_id,
            email,
            principal_type,
            roles,
        } = token.into_claims();

        Self {
            id: subject_id,
            email,
            principal_type,
            roles,
            expires_at,
        }
    }
}
