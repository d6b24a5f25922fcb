//! Account roles and the acting party of a request.
//!
//! Role names travel inside access tokens as plain strings; [`ActorRole`] is
//! the parsed form used by the domain layer.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_WORKER: &str = "worker";
pub const ROLE_EMPLOYER: &str = "employer";
pub const ROLE_ADMIN: &str = "admin";

/// Older clients label job seekers as `"user"`; treated as [`ActorRole::Worker`].
pub const ROLE_WORKER_LEGACY: &str = "user";

/// All role names accepted in tokens.
pub const VALID_ROLES: &[&str] = &[ROLE_WORKER, ROLE_EMPLOYER, ROLE_ADMIN, ROLE_WORKER_LEGACY];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Worker,
    Employer,
    Admin,
}

impl ActorRole {
    /// Parse a role name as carried in access-token claims.
    pub fn parse(role: &str) -> Result<Self, CoreError> {
        match role {
            ROLE_WORKER | ROLE_WORKER_LEGACY => Ok(Self::Worker),
            ROLE_EMPLOYER => Ok(Self::Employer),
            ROLE_ADMIN => Ok(Self::Admin),
            other => Err(CoreError::Unauthorized(format!(
                "Unknown role '{other}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }

    /// Canonical role name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Worker => ROLE_WORKER,
            Self::Employer => ROLE_EMPLOYER,
            Self::Admin => ROLE_ADMIN,
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated party performing an operation.
///
/// Supplied by the identity layer; the domain layer only compares it against
/// the parties recorded on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub role: ActorRole,
    pub id: DbId,
}

impl Actor {
    pub fn worker(id: DbId) -> Self {
        Self {
            role: ActorRole::Worker,
            id,
        }
    }

    pub fn employer(id: DbId) -> Self {
        Self {
            role: ActorRole::Employer,
            id,
        }
    }

    pub fn admin(id: DbId) -> Self {
        Self {
            role: ActorRole::Admin,
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_roles() {
        assert_eq!(ActorRole::parse("worker").unwrap(), ActorRole::Worker);
        assert_eq!(ActorRole::parse("employer").unwrap(), ActorRole::Employer);
        assert_eq!(ActorRole::parse("admin").unwrap(), ActorRole::Admin);
    }

    #[test]
    fn legacy_user_role_maps_to_worker() {
        assert_eq!(ActorRole::parse("user").unwrap(), ActorRole::Worker);
    }

    #[test]
    fn unknown_role_is_unauthorized() {
        let err = ActorRole::parse("superuser").unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized(_)));
    }

    #[test]
    fn as_str_round_trips_through_parse() {
        for role in [ActorRole::Worker, ActorRole::Employer, ActorRole::Admin] {
            assert_eq!(ActorRole::parse(role.as_str()).unwrap(), role);
        }
    }
}
