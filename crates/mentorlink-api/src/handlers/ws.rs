//! WebSocket upgrade handler.

use axum::body::Bytes;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use mentorlink_core::error::AppError;
use mentorlink_realtime::connection::Frame;
use mentorlink_realtime::connection::authenticator::AuthenticatedConnection;

use crate::dto::request::WsQuery;
use crate::error::ApiResult;
use crate::extractors::auth::bearer_token;
use crate::state::AppState;

/// GET /ws?token={jwt}: WebSocket upgrade
///
/// The token may also arrive as `Authorization: Bearer`. It is checked
/// before the upgrade, so a bad token refuses the handshake with 401.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> ApiResult<Response> {
    let token = query.token.as_deref().or_else(|| bearer_token(&headers));
    let auth = state.realtime.authenticator.authenticate(token)?;
    let ws = ws.map_err(|e| AppError::invalid_input(format!("WebSocket upgrade required: {e}")))?;

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, auth, socket)))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, auth: AuthenticatedConnection, socket: WebSocket) {
    let engine = state.realtime;
    let (handle, mut outbound_rx) = engine
        .connections
        .register(auth.user_id, auth.role, auth.display_name);
    let conn_id = handle.id;
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Outbound forwarder
    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            let msg = match frame {
                Frame::Text(text) => Message::Text(text.into()),
                Frame::Ping => Message::Ping(Bytes::new()),
            };
            if ws_tx.send(msg).await.is_err() {
                break;
            }
        }
    });
    let heartbeat = engine.spawn_heartbeat(handle.clone());
    let shutdown = engine.shutdown_token();

    info!(conn_id = %conn_id, user_id = %auth.user_id, "WebSocket connection established");

    loop {
        tokio::select! {
            _ = handle.closed() => break,
            _ = shutdown.cancelled() => break,
            next = ws_rx.next() => match next {
                Some(Ok(Message::Text(text))) => {
                    engine.connections.handle_inbound(&conn_id, text.as_str()).await;
                }
                Some(Ok(Message::Pong(_))) => handle.record_pong(),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Binary(_))) => {
                    debug!(conn_id = %conn_id, "Ignoring binary frame");
                }
                Some(Ok(Message::Ping(_))) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            }
        }
    }

    // Cleanup
    engine.connections.unregister(&conn_id);
    heartbeat.abort();
    writer.abort();

    info!(conn_id = %conn_id, user_id = %auth.user_id, "WebSocket connection closed");
}
