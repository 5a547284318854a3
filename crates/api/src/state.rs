use std::sync::Arc;

use wayside_core::cache::TtlCache;
use wayside_core::types::DbId;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: wayside_db::DbPool,
    /// Server configuration (JWT, fee schedule, CORS).
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<wayside_events::EventBus>,
    /// Payment gateway client.
    pub payments: Arc<wayside_payments::PaymentClient>,
    /// Per-user dashboard aggregates, fresh for five minutes.
    pub dashboard_cache: Arc<TtlCache<DbId, serde_json::Value>>,
}
