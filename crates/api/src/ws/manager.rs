use std::collections::HashMap;

use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};
use wayside_core::types::{DbId, Timestamp};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Authenticated user ID. Connections are only registered after JWT
    /// validation, so this is always set.
    pub user_id: DbId,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Manages all active WebSocket connections.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String, user_id: DbId) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Broadcast a message to all connected clients.
    ///
    /// Connections whose send channels are closed are silently skipped
    /// (they will be cleaned up on their next receive loop iteration).
    pub async fn broadcast(&self, message: Message) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(message.clone());
        }
    }

    /// Send a message to all connections belonging to a specific user.
    ///
    /// Returns the number of connections the message was sent to.
    pub async fn send_to_user(&self, user_id: DbId, message: Message) -> usize {
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values() {
            if conn.user_id == user_id {
                let _ = conn.sender.send(message.clone());
                count += 1;
            }
        }
        count
    }

    /// Drop connections whose send channel is closed (peer went away
    /// without a close frame). Returns the number pruned.
    pub async fn prune_closed(&self) -> usize {
        let mut conns = self.connections.write().await;
        let before = conns.len();
        conns.retain(|_, conn| !conn.sender.is_closed());
        before - conns.len()
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Close every connection (graceful shutdown).
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        for (_, conn) in conns.drain() {
            let _ = conn.sender.send(Message::Close(None));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_and_send_to_user() {
        let manager = WsManager::new();
        let mut rx = manager.add("conn-1".to_string(), 42).await;

        let sent = manager
            .send_to_user(42, Message::Text("hello".into()))
            .await;
        assert_eq!(sent, 1);
        assert!(matches!(rx.recv().await, Some(Message::Text(_))));

        // A different user receives nothing.
        let sent = manager.send_to_user(7, Message::Text("nope".into())).await;
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn test_prune_closed_connections() {
        let manager = WsManager::new();
        let rx = manager.add("conn-1".to_string(), 1).await;
        drop(rx); // Peer is gone.
        let _rx2 = manager.add("conn-2".to_string(), 2).await;

        let pruned = manager.prune_closed().await;
        assert_eq!(pruned, 1);
        assert_eq!(manager.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let manager = WsManager::new();
        let _rx = manager.add("conn-1".to_string(), 1).await;
        manager.remove("conn-1").await;
        assert_eq!(manager.connection_count().await, 0);
    }
}
