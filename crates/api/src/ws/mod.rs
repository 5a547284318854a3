//! WebSocket support: connection manager, upgrade handler, heartbeat.

pub mod handler;
pub mod heartbeat;
pub mod manager;

pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
