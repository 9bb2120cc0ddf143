//! JSON wire protocol spoken over the real-time channel.

use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};

/// Messages a browser client may send.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Subscribe this connection to the room of `username`'s portfolio.
    #[serde(rename = "joinPortfolioRoom")]
    JoinPortfolioRoom { username: String },
}

/// Messages the server pushes to subscribed clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// A portfolio in a joined room was saved; `portfolio` is the full
    /// just-saved document.
    #[serde(rename = "portfolioUpdated")]
    PortfolioUpdated {
        username: String,
        portfolio: serde_json::Value,
    },
}

impl ServerMessage {
    /// Encode as a WebSocket text frame.
    pub fn to_message(&self) -> Message {
        Message::Text(serde_json::to_string(self).unwrap_or_default().into())
    }
}
