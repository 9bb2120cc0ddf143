use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::state::AppState;
use crate::ws::manager::RoomRegistry;
use crate::ws::protocol::ClientMessage;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is registered with [`RoomRegistry`] and
/// managed by two tasks (sender + receiver). Joining rooms requires no
/// authentication: published portfolios are public, and unpublished ones
/// only ever reach the room after their owner saves.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.rooms))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with the registry.
///   2. Spawns a sender task that forwards messages from the registry channel.
///   3. Processes inbound messages (room joins) on the current task.
///   4. Cleans up on disconnect, dropping all room memberships.
async fn handle_socket(socket: WebSocket, rooms: Arc<RoomRegistry>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    // Register and get the receiver for outbound messages.
    let mut rx = rooms.add(conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: process inbound messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::JoinPortfolioRoom { username }) => {
                    let newly_joined = rooms.join(&conn_id, &username).await;
                    tracing::debug!(
                        conn_id = %conn_id,
                        room = %username,
                        newly_joined,
                        "Room join"
                    );
                }
                Err(e) => {
                    // Non-fatal: log and keep the connection alive.
                    tracing::debug!(conn_id = %conn_id, error = %e, "Unparseable client message");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection (implicitly leaves all rooms) and abort
    // the sender task.
    rooms.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}
