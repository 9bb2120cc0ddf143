//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`PortfolioEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` across the application. A
//! single subscriber consuming the channel sees events in publish order,
//! which is what gives the real-time layer its in-room ordering guarantee.

use chrono::{DateTime, Utc};
use folio_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event type emitted after a successful portfolio save.
pub const PORTFOLIO_UPDATED: &str = "portfolio.updated";

/// A domain event scoped to one account's portfolio.
///
/// Constructed via [`PortfolioEvent::new`] and enriched with
/// [`with_actor`](PortfolioEvent::with_actor) and
/// [`with_payload`](PortfolioEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioEvent {
    /// Dot-separated event name, e.g. `"portfolio.updated"`.
    pub event_type: String,

    /// Lowercase username owning the affected portfolio; doubles as the
    /// room key for real-time fan-out.
    pub username: String,

    /// Optional id of the user that triggered the event.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data. For
    /// `portfolio.updated` this is the full saved document.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PortfolioEvent {
    /// Create a new event for the given username.
    pub fn new(event_type: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            username: username.into(),
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`PortfolioEvent`].
pub struct EventBus {
    sender: broadcast::Sender<PortfolioEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped --
    /// a save with no open viewers has nobody to notify.
    pub fn publish(&self, event: PortfolioEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<PortfolioEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
