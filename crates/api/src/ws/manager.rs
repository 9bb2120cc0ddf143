//! Room-scoped WebSocket connection registry.
//!
//! A room is keyed by lowercase username. Membership is modeled explicitly
//! as the set of rooms held on each connection entry: joining is
//! idempotent (duplicate joins deduplicate, so one save delivers one
//! event), and removing a connection drops all of its memberships at once
//! -- there is no explicit leave operation.

use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use folio_core::handle;
use folio_core::types::Timestamp;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct RoomConnection {
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// Rooms this connection has joined. A connection may belong to any
    /// number of rooms (editor plus several public views, for example).
    pub rooms: HashSet<String>,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Manages all active WebSocket connections and their room memberships.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct RoomRegistry {
    connections: RwLock<HashMap<String, RoomConnection>>,
}

impl RoomRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection (state: Connected, no rooms yet).
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = RoomConnection {
            sender: tx,
            rooms: HashSet::new(),
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID, implicitly leaving every room it
    /// joined.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Join the connection to the room of `username` (normalized to
    /// lowercase). Idempotent: returns `false` when the connection was
    /// already a member or does not exist.
    pub async fn join(&self, conn_id: &str, username: &str) -> bool {
        let room = handle::normalize(username);
        match self.connections.write().await.get_mut(conn_id) {
            Some(conn) => conn.rooms.insert(room),
            None => false,
        }
    }

    /// Whether `conn_id` is currently a member of `username`'s room.
    pub async fn is_joined(&self, conn_id: &str, username: &str) -> bool {
        let room = handle::normalize(username);
        self.connections
            .read()
            .await
            .get(conn_id)
            .is_some_and(|conn| conn.rooms.contains(&room))
    }

    /// Deliver a message to every connection joined to `username`'s room,
    /// including the publisher's own connection if it is joined (no
    /// self-filtering).
    ///
    /// Connections whose send channels are closed are silently skipped
    /// (they will be cleaned up on their next receive loop iteration) and
    /// do not count. Returns the number of connections the message was
    /// actually sent to.
    pub async fn publish(&self, username: &str, message: Message) -> usize {
        let room = handle::normalize(username);
        let conns = self.connections.read().await;
        conns
            .values()
            .filter(|conn| conn.rooms.contains(&room))
            .filter(|conn| conn.sender.send(message.clone()).is_ok())
            .count()
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Return the number of connections joined to `username`'s room.
    pub async fn room_member_count(&self, username: &str) -> usize {
        let room = handle::normalize(username);
        self.connections
            .read()
            .await
            .values()
            .filter(|conn| conn.rooms.contains(&room))
            .count()
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
