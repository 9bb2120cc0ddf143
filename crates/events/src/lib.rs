//! Folio event bus and outbound delivery.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`; the save path publishes here and the
//!   real-time router fans out to WebSocket rooms.
//! - [`PortfolioEvent`] — the canonical domain event envelope.
//! - [`delivery`] — SMTP mail for password-reset links.

pub mod bus;
pub mod delivery;

pub use bus::{EventBus, PortfolioEvent, PORTFOLIO_UPDATED};
pub use delivery::email::{EmailConfig, EmailDelivery};
