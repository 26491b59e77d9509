//! WebSocket inbound adapter.
//!
//! Responsibilities:
//! - resolve the caller identity from the session cookie at upgrade time
//! - register the connection with the broadcaster and spawn the session loop
//! - keep WebSocket-specific concerns at the edge of the system

use actix_web::web::{self, Payload};
use actix_web::{get, rt, HttpRequest, HttpResponse};
use tracing::{debug, error};

pub mod broadcast;
mod dispatch;
pub mod messages;
mod session;
pub mod state;

use crate::inbound::http::session::SessionContext;
use dispatch::Dispatcher;

/// Handle WebSocket upgrade for the `/ws` endpoint.
///
/// Anonymous upgrades are accepted; such a connection receives catalog
/// refreshes and may only request catalog reloads.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let caller = SessionContext::from_http_request(&req).caller()?;

    let (response, ws_session, msg_stream) = actix_ws::handle(&req, stream).map_err(|err| {
        error!(error = %err, "WebSocket upgrade failed");
        err
    })?;

    let (connection, pushes) = state.broadcaster.subscribe(caller);
    debug!(?connection, user = ?caller.map(|c| c.id), "WebSocket connected");
    let dispatcher = Dispatcher::new(
        state.commands.clone(),
        state.views.clone(),
        state.broadcaster.clone(),
        caller,
    );
    let broadcaster = state.broadcaster.clone();
    rt::spawn(async move {
        session::handle_ws_session(dispatcher, ws_session, msg_stream, pushes).await;
        broadcaster.unsubscribe(connection);
        debug!(?connection, "WebSocket disconnected");
    });

    Ok(response)
}
