//! Real-time update routing.
//!
//! The [`UpdateRouter`] subscribes to the event bus and fans portfolio
//! updates out to the WebSocket room of the affected username.

pub mod router;

pub use router::UpdateRouter;
