//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses or WebSocket error frames. A failed operation always leaves
//! state exactly as it was before the call; no transition is ever retried.

use serde::{Deserialize, Serialize};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A lifecycle precondition does not hold.
    GuardViolation,
    /// A referenced entity does not exist.
    NotFound,
    /// The caller is anonymous but the operation requires a signed-in user.
    Unauthorized,
    /// The caller lacks the role or ownership required for the action.
    Forbidden,
    /// The request payload is malformed or violates a data invariant.
    InvalidRequest,
    /// The persistence collaborator failed; the transaction was rolled back.
    Persistence,
}

/// Domain failure raised by the lifecycle engine and the view assembler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("guard violation: {message}")]
    GuardViolation { message: String },
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: i64 },
    #[error("sign-in required")]
    Unauthorized,
    #[error("forbidden: {message}")]
    Forbidden { message: String },
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
    #[error("persistence failure: {message}")]
    Persistence { message: String },
}

impl Error {
    pub fn guard(message: impl Into<String>) -> Self {
        Self::GuardViolation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: i64) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Stable code for wire envelopes.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::GuardViolation { .. } => ErrorCode::GuardViolation,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Unauthorized => ErrorCode::Unauthorized,
            Self::Forbidden { .. } => ErrorCode::Forbidden,
            Self::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            Self::Persistence { .. } => ErrorCode::Persistence,
        }
    }
}

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_variants() {
        assert_eq!(Error::guard("x").code(), ErrorCode::GuardViolation);
        assert_eq!(Error::not_found("listing", 3).code(), ErrorCode::NotFound);
        assert_eq!(Error::Unauthorized.code(), ErrorCode::Unauthorized);
        assert_eq!(Error::forbidden("x").code(), ErrorCode::Forbidden);
        assert_eq!(Error::invalid_request("x").code(), ErrorCode::InvalidRequest);
        assert_eq!(Error::persistence("x").code(), ErrorCode::Persistence);
    }

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(
            Error::not_found("listing", 7).to_string(),
            "listing 7 not found"
        );
    }

    #[test]
    fn code_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::GuardViolation).expect("serializes"),
            "\"guard_violation\""
        );
    }
}
