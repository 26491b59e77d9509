//! Login adapter backed by a [`MarketStore`].
//!
//! Credentials are fingerprinted with SHA-256; the comparison happens against
//! the stored hash, never against a plain password. Swapping in a slower KDF
//! only touches this adapter.

use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::domain::ports::{LoginError, LoginService, MarketStore, NewProfile, StoreError};
use crate::domain::{NewUser, Role, User};

/// SHA-256 based [`LoginService`] over the market store.
pub struct Sha256LoginService<S> {
    store: Arc<S>,
}

impl<S> Sha256LoginService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

fn fingerprint(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn map_store_error(error: StoreError) -> LoginError {
    LoginError::backend(error.to_string())
}

#[async_trait]
impl<S: MarketStore> LoginService for Sha256LoginService<S> {
    async fn register(&self, profile: NewProfile) -> Result<User, LoginError> {
        let email = profile.email.clone();
        let user = NewUser {
            username: profile.username,
            role: Role::Client,
            phone: profile.phone,
            email: profile.email,
            credential_hash: fingerprint(&profile.password),
        };
        match self.store.insert_user(user).await {
            Ok(user) => {
                info!(user = %user.id, "user registered");
                Ok(user)
            }
            Err(StoreError::Conflict { .. }) => Err(LoginError::email_taken(email)),
            Err(error) => Err(map_store_error(error)),
        }
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, LoginError> {
        let Some(user) = self
            .store
            .user_by_email(email)
            .await
            .map_err(map_store_error)?
        else {
            return Ok(None);
        };
        if user.credential_hash == fingerprint(password) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}
