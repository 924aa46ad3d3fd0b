//! Claims carried inside tokens.
//!
//! Access tokens carry the full [`Claims`]. Refresh tokens carry only
//! [`RefreshClaims`], the subject and email, so a leaked refresh token
//! discloses as little as possible.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Token class. Selects the signing key, the lifetime and the embedded
/// claim subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenClass {
    /// Short-lived token presented on every request.
    Access,
    /// Long-lived token exchanged for a new pair.
    Refresh,
}

impl TokenClass {
    /// Both classes, access first.
    pub const ALL: [TokenClass; 2] = [TokenClass::Access, TokenClass::Refresh];

    /// Returns the class name as used in logs and configuration keys.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims asserted about a principal in an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Stable identifier of the principal.
    pub subject_id: String,

    /// Principal's email address.
    pub email: String,

    /// Role or category of the principal (e.g. `student`, `admin`).
    pub principal_type: String,

    /// Roles granted to the principal.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub roles: BTreeSet<String>,
}

impl Claims {
    /// Creates claims with no roles.
    #[must_use]
    pub fn new(
        subject_id: impl Into<String>,
        email: impl Into<String>,
        principal_type: impl Into<String>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            email: email.into(),
            principal_type: principal_type.into(),
            roles: BTreeSet::new(),
        }
    }

    /// Adds a role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Adds several roles.
    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// The minimized subset embedded in refresh tokens.
    #[must_use]
    pub fn to_refresh_claims(&self) -> RefreshClaims {
        RefreshClaims::from(self)
    }
}

/// Minimized claims embedded in refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    /// Stable identifier of the principal.
    pub subject_id: String,

    /// Principal's email address.
    pub email: String,
}

impl From<&Claims> for RefreshClaims {
    fn from(claims: &Claims) -> Self {
        Self {
            subject_id: claims.subject_id.clone(),
            email: claims.email.clone(),
        }
    }
}
