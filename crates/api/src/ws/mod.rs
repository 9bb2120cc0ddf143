//! WebSocket infrastructure for real-time portfolio updates.
//!
//! Provides room-scoped connection management, the wire protocol, heartbeat
//! monitoring, and the HTTP upgrade handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod manager;
pub mod protocol;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::RoomRegistry;
pub use protocol::{ClientMessage, ServerMessage};
