//! WebSocket session handler tests.

use super::*;
use std::sync::Arc;

use actix_web::{dev::Server, dev::ServerHandle, App, HttpServer};
use awc::{ws::Codec, ws::Frame, ws::Message, BoxedSocket};
use futures_util::{SinkExt, StreamExt};
use rstest::{fixture, rstest};
use serde_json::{json, Value};

use crate::domain::lifecycle::{LifecycleEngine, SiblingPolicy};
use crate::domain::ports::MarketplaceViews;
use crate::domain::views::ViewAssembler;
use crate::inbound::ws;
use crate::inbound::ws::broadcast::Broadcaster;
use crate::inbound::ws::state::WsState;
use crate::outbound::persistence::MemoryStore;

#[fixture]
async fn start_ws_server() -> (String, Server) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let store = Arc::new(MemoryStore::new());
    let views: Arc<dyn MarketplaceViews> = Arc::new(ViewAssembler::new(Arc::clone(&store)));
    let ws_state = WsState::new(
        Arc::new(LifecycleEngine::new(store, SiblingPolicy::Retain)),
        Arc::clone(&views),
        Broadcaster::new(views),
    );
    let server = HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(ws_state.clone()))
            .service(ws::ws_entry)
    })
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    let url = format!("http://{addr}");
    (url, server)
}

#[fixture]
async fn ws_client(
    #[future] start_ws_server: (String, Server),
) -> (actix_codec::Framed<BoxedSocket, Codec>, ServerHandle) {
    let (url, server) = start_ws_server.await;
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let (_resp, socket) = awc::Client::default()
        .ws(format!("{url}/ws"))
        .connect()
        .await
        .expect("websocket connect");

    (socket, handle)
}

async fn next_text_frame(socket: &mut actix_codec::Framed<BoxedSocket, Codec>) -> Value {
    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Text(bytes) => return serde_json::from_slice(&bytes).expect("json frame"),
            Frame::Ping(_) | Frame::Pong(_) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

#[rstest]
#[actix_rt::test]
async fn anonymous_catalog_reload_is_answered(
    #[future] ws_client: (actix_codec::Framed<BoxedSocket, Codec>, ServerHandle),
) {
    let (mut socket, _server) = ws_client.await;
    socket
        .send(Message::Text(
            json!({"event": "reload_catalog"}).to_string().into(),
        ))
        .await
        .expect("send text");

    let value = next_text_frame(&mut socket).await;
    assert_eq!(value["event"], "catalog");
    assert_eq!(value["data"], json!([]));
}

#[rstest]
#[actix_rt::test]
async fn anonymous_mutations_get_an_unauthorized_frame(
    #[future] ws_client: (actix_codec::Framed<BoxedSocket, Codec>, ServerHandle),
) {
    let (mut socket, _server) = ws_client.await;
    socket
        .send(Message::Text(
            json!({"event": "add_bag", "data": 1}).to_string().into(),
        ))
        .await
        .expect("send text");

    let value = next_text_frame(&mut socket).await;
    assert_eq!(value["event"], "error");
    assert_eq!(value["data"]["code"], "unauthorized");
}

#[rstest]
#[actix_rt::test]
async fn malformed_json_gets_an_error_frame_and_the_connection_survives(
    #[future] ws_client: (actix_codec::Framed<BoxedSocket, Codec>, ServerHandle),
) {
    let (mut socket, _server) = ws_client.await;
    socket
        .send(Message::Text("not-json".into()))
        .await
        .expect("send text");

    let value = next_text_frame(&mut socket).await;
    assert_eq!(value["event"], "error");
    assert_eq!(value["data"]["code"], "invalid_request");

    // Still serviceable afterwards.
    socket
        .send(Message::Text(
            json!({"event": "reload_catalog"}).to_string().into(),
        ))
        .await
        .expect("send text");
    let value = next_text_frame(&mut socket).await;
    assert_eq!(value["event"], "catalog");
}

#[rstest]
#[actix_rt::test]
async fn closes_after_timeout_without_client_messages(
    #[future] ws_client: (actix_codec::Framed<BoxedSocket, Codec>, ServerHandle),
) {
    let (mut socket, _server) = ws_client.await;
    tokio::time::sleep(CLIENT_TIMEOUT + HEARTBEAT_INTERVAL * 3).await;

    use std::time::Duration;

    let observed_close = tokio::time::timeout(Duration::from_secs(2), async {
        let mut observed = None;
        while let Some(frame) = socket.next().await {
            let frame = frame.expect("frame");
            match frame {
                Frame::Ping(_) | Frame::Pong(_) => continue,
                Frame::Close(reason) => {
                    observed = reason;
                    break;
                }
                other => panic!("unexpected frame before close: {other:?}"),
            }
        }
        observed
    })
    .await
    .expect("close frame missing within timeout")
    .expect("close frame missing after timeout");

    assert_eq!(observed_close.code, CloseCode::Normal);
    assert_eq!(
        observed_close.description.as_deref(),
        Some("heartbeat timeout")
    );
}
