//! Port for account registration and credential verification.
//!
//! Credential hashing mechanics live behind this boundary; the domain only
//! sees opaque hashes on the [`User`] entity.

use async_trait::async_trait;

use crate::domain::User;

/// Errors raised by login adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// The email is already registered.
    #[error("email {email} is already registered")]
    EmailTaken { email: String },
    /// The backing store failed.
    #[error("login backend failure: {message}")]
    Backend { message: String },
}

impl LoginError {
    pub fn email_taken(email: impl Into<String>) -> Self {
        Self::EmailTaken {
            email: email.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Profile fields supplied at registration.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub username: String,
    pub phone: String,
    pub email: String,
    pub password: String,
}

/// Registration and credential verification.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Register a new client-role user.
    async fn register(&self, profile: NewProfile) -> Result<User, LoginError>;

    /// Verify credentials, returning the user on success and `None` when the
    /// email is unknown or the password does not match.
    async fn authenticate(&self, email: &str, password: &str)
        -> Result<Option<User>, LoginError>;
}
