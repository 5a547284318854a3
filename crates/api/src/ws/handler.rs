//! WebSocket upgrade handler.
//!
//! Browsers cannot set an `Authorization` header on a WebSocket
//! handshake, so the access token arrives as a `?token=` query
//! parameter and is validated before the upgrade completes.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;
use wayside_core::error::CoreError;
use wayside_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Query parameters for `GET /ws`.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: String,
}

/// GET /api/v1/ws
///
/// Validate the token, then upgrade and register the connection.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    upgrade: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let claims = validate_token(&params.token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
    })?;

    let user_id = claims.sub;
    Ok(upgrade.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

/// Pump messages between the socket and the connection manager until the
/// peer disconnects.
async fn handle_socket(socket: WebSocket, state: AppState, user_id: DbId) {
    let conn_id = Uuid::new_v4().to_string();
    let mut outbound = state.ws_manager.add(conn_id.clone(), user_id).await;

    tracing::debug!(user_id, conn_id = %conn_id, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            // Outbound: manager -> peer.
            msg = outbound.recv() => {
                match msg {
                    Some(msg) => {
                        let is_close = matches!(msg, Message::Close(_));
                        if sink.send(msg).await.is_err() || is_close {
                            break;
                        }
                    }
                    None => break, // Manager dropped the connection.
                }
            }
            // Inbound: peer -> server. The feed is push-only; we only
            // care about pong/close frames.
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.ws_manager.remove(&conn_id).await;
    tracing::debug!(user_id, conn_id = %conn_id, "WebSocket disconnected");
}
