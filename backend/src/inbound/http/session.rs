//! Session helpers to keep handlers free of framework-specific logic.
//!
//! Wraps the Actix cookie session so adapters only deal with the domain's
//! [`Caller`]. Login stores the user id and role together; the role is
//! immutable after registration, so the cookie copy cannot go stale.

use actix_session::{Session, SessionExt};
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Caller, Error, Role, User, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLE_KEY: &str = "role";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Construct the wrapper for a non-extractor context such as the
    /// WebSocket upgrade handler.
    pub fn from_http_request(req: &HttpRequest) -> Self {
        Self(req.get_session())
    }

    /// Record the authenticated user in the session cookie.
    pub fn persist_caller(&self, user: &User) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user.id.value())
            .and_then(|()| self.0.insert(ROLE_KEY, user.role))
            .map_err(|error| Error::persistence(format!("failed to persist session: {error}")))
    }

    /// Fetch the caller from the session, if one is signed in.
    pub fn caller(&self) -> Result<Option<Caller>, Error> {
        let id = self
            .0
            .get::<i64>(USER_ID_KEY)
            .map_err(|error| Error::persistence(format!("failed to read session: {error}")))?;
        let role = self
            .0
            .get::<Role>(ROLE_KEY)
            .map_err(|error| Error::persistence(format!("failed to read session: {error}")))?;
        match (id, role) {
            (Some(id), Some(role)) => Ok(Some(Caller::new(UserId::new(id), role))),
            (None, None) => Ok(None),
            _ => {
                warn!("session cookie is missing half of the caller identity");
                Ok(None)
            }
        }
    }

    /// Require a signed-in caller or return `401 Unauthorized`.
    pub fn require_caller(&self) -> Result<Caller, Error> {
        self.caller()?.ok_or(Error::Unauthorized)
    }

    /// Drop the session entirely.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
