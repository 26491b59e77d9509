//! Test helpers for inbound HTTP components.

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};

/// Build a session middleware matching the production cookie contract
/// (`session`, `SameSite=Lax`), but with a fresh key per invocation and the
/// `Secure` flag off so plain-HTTP test requests carry the cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_same_site(SameSite::Lax)
        .cookie_secure(false)
        .build()
}
