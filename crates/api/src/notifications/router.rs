//! Event-to-room routing engine.
//!
//! [`UpdateRouter`] is the single consumer between the event bus and the
//! room registry. Being the only consumer is what preserves the in-room
//! ordering guarantee: events leave the broadcast channel in publish order
//! and are delivered to each room in that same order.

use std::sync::Arc;

use folio_events::{PortfolioEvent, PORTFOLIO_UPDATED};
use tokio::sync::broadcast;

use crate::ws::protocol::ServerMessage;
use crate::ws::RoomRegistry;

/// Routes portfolio events to their WebSocket rooms.
pub struct UpdateRouter {
    rooms: Arc<RoomRegistry>,
}

impl UpdateRouter {
    /// Create a new router over the given room registry.
    pub fn new(rooms: Arc<RoomRegistry>) -> Self {
        Self { rooms }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](folio_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PortfolioEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route_event(event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Update router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, update router shutting down");
                    break;
                }
            }
        }
    }

    /// Fan a single event out to the room named by its username.
    async fn route_event(&self, event: PortfolioEvent) {
        if event.event_type != PORTFOLIO_UPDATED {
            return;
        }

        let message = ServerMessage::PortfolioUpdated {
            username: event.username.clone(),
            portfolio: event.payload,
        };

        let delivered = self
            .rooms
            .publish(&event.username, message.to_message())
            .await;

        tracing::debug!(
            room = %event.username,
            delivered,
            "Portfolio update fanned out"
        );
    }
}
