//! Periodic WebSocket heartbeat.
//!
//! Pings every connection on a fixed interval and prunes connections
//! whose channels have closed, so the manager's view of live peers
//! stays accurate even when a client vanishes without a close frame.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use tokio::task::JoinHandle;

use super::manager::WsManager;

/// Interval between heartbeat pings.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Spawn the heartbeat task. Abort the returned handle on shutdown.
pub fn start_heartbeat(manager: Arc<WsManager>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
        loop {
            ticker.tick().await;

            let pruned = manager.prune_closed().await;
            if pruned > 0 {
                tracing::debug!(pruned, "Pruned dead WebSocket connections");
            }

            manager.broadcast(Message::Ping(Vec::new().into())).await;
        }
    })
}
