//! Session claims and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Role carried in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform administrator. Not bound to any single tenant.
    SuperAdmin,
    /// Administrator of one organization.
    Admin,
    /// Regular member of one organization.
    Member,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "superadmin",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "superadmin" => Some(Self::SuperAdmin),
            "admin" => Some(Self::Admin),
            "member" | "user" => Some(Self::Member),
            _ => None,
        }
    }

    /// Returns true for the platform-level role that bypasses tenant scoping.
    #[must_use]
    pub const fn is_platform_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Organization ID (current context).
    pub org: Uuid,
    /// User's role.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, org_id: Uuid, role: Role, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            org: org_id,
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the organization ID from claims.
    #[must_use]
    pub const fn organization_id(&self) -> Uuid {
        self.org
    }

    /// Returns the parsed role, or `None` if the claim holds an unknown role.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}
