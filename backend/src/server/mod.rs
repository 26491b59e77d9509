//! Server construction and middleware wiring.

mod config;

pub use config::AppConfig;

use std::sync::Arc;

use actix_session::{
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
    SessionMiddleware,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
use tracing::info;

use crate::domain::lifecycle::LifecycleEngine;
use crate::domain::ports::{LoginService, MarketplaceCommands, MarketplaceViews};
use crate::domain::views::ViewAssembler;
use crate::inbound::http::accounts::{login, logout, register};
use crate::inbound::http::health::healthz;
use crate::inbound::http::listings::create_listing;
use crate::inbound::http::state::HttpState;
use crate::inbound::ws;
use crate::inbound::ws::broadcast::Broadcaster;
use crate::inbound::ws::state::WsState;
use crate::outbound::persistence::{MemoryStore, Sha256LoginService};

#[derive(Clone)]
struct AppDependencies {
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
    key: Key,
    cookie_secure: bool,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        ws_state,
        key,
        cookie_secure,
    } = deps;

    // The WebSocket upgrade reads the caller from the same cookie, so the
    // session middleware wraps the whole app rather than just the API scope.
    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api")
        .service(register)
        .service(login)
        .service(logout)
        .service(create_listing);

    App::new()
        .app_data(http_state)
        .app_data(ws_state)
        .wrap(session)
        .service(api)
        .service(ws::ws_entry)
        .service(healthz)
}

/// Construct the HTTP server with the full in-process service stack.
///
/// # Errors
/// Propagates [`std::io::Error`] when the session key cannot be loaded or the
/// socket cannot be bound.
pub fn create_server(config: AppConfig) -> std::io::Result<Server> {
    let key = config.load_session_key()?;

    let store = Arc::new(MemoryStore::new());
    let commands: Arc<dyn MarketplaceCommands> = Arc::new(LifecycleEngine::new(
        Arc::clone(&store),
        config.sibling_policy,
    ));
    let views: Arc<dyn MarketplaceViews> = Arc::new(ViewAssembler::new(Arc::clone(&store)));
    let login_service: Arc<dyn LoginService> = Arc::new(Sha256LoginService::new(store));
    let broadcaster = Broadcaster::new(Arc::clone(&views));

    let http_state = web::Data::new(HttpState::new(
        login_service,
        Arc::clone(&commands),
        broadcaster.clone(),
    ));
    let ws_state = web::Data::new(WsState::new(commands, views, broadcaster));

    let cookie_secure = config.cookie_secure;
    info!(bind_addr = %config.bind_addr, policy = ?config.sibling_policy, "starting server");
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
            key: key.clone(),
            cookie_secure,
        })
    })
    .bind(config.bind_addr)?
    .run();

    Ok(server)
}
