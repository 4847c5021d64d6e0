//! Roles and the authenticated principal.
//!
//! The gate verifies the session token and inserts a [`Principal`] into the
//! request extensions; handlers read it from there instead of decoding cookies
//! themselves.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use utoipa::ToSchema;

use super::token::SessionClaims;

/// Capability label attached to a credential record and carried as a claim.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Authenticated user context derived from a verified session token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub email: String,
    pub role: Role,
    pub expires_at: i64,
}

impl From<SessionClaims> for Principal {
    fn from(claims: SessionClaims) -> Self {
        Self {
            email: claims.sub,
            role: claims.role,
            expires_at: claims.exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_labels_only() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert_eq!(
            "Admin".parse::<Role>(),
            Err(UnknownRole("Admin".to_string()))
        );
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&Role::Admin)?, "\"admin\"");
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
        Ok(())
    }

    #[test]
    fn principal_from_claims() {
        let claims = SessionClaims {
            sub: "a@b.com".to_string(),
            role: Role::Admin,
            iat: 10,
            exp: 20,
            jti: "id".to_string(),
        };
        let principal = Principal::from(claims);
        assert_eq!(principal.email, "a@b.com");
        assert_eq!(principal.role, Role::Admin);
        assert_eq!(principal.expires_at, 20);
    }
}
