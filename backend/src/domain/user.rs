//! Users and the explicit caller identity passed to every operation.

use serde::{Deserialize, Serialize};

use crate::domain::ids::UserId;

/// Role a user holds. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Administrator,
}

/// A registered user.
///
/// `credential_hash` is an opaque fingerprint owned by the login adapter; the
/// lifecycle engine never inspects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub phone: String,
    pub email: String,
    pub credential_hash: String,
}

/// User fields supplied at registration; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub role: Role,
    pub phone: String,
    pub email: String,
    pub credential_hash: String,
}

/// Explicit caller identity.
///
/// Every lifecycle and view operation takes one of these; there is no ambient
/// "current user" anywhere in the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: UserId,
    pub role: Role,
}

impl Caller {
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Whether the caller holds the administrator role.
    #[must_use]
    pub const fn is_administrator(&self) -> bool {
        matches!(self.role, Role::Administrator)
    }
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::Administrator).expect("serializes"),
            "\"administrator\""
        );
        assert_eq!(
            serde_json::to_string(&Role::Client).expect("serializes"),
            "\"client\""
        );
    }

    #[test]
    fn administrator_check() {
        assert!(Caller::new(UserId::new(1), Role::Administrator).is_administrator());
        assert!(!Caller::new(UserId::new(1), Role::Client).is_administrator());
    }
}
