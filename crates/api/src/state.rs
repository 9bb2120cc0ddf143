use std::sync::Arc;

use folio_events::{EmailDelivery, EventBus};

use crate::assets::AssetStore;
use crate::cache::IdentityCache;
use crate::config::ServerConfig;
use crate::ws::RoomRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: folio_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Room-scoped WebSocket connection registry.
    pub rooms: Arc<RoomRegistry>,
    /// Epoch-cleared identity projection cache (`/auth/me` read path only).
    pub identity_cache: Arc<IdentityCache>,
    /// Bus carrying portfolio events from the save path to the router.
    pub event_bus: Arc<EventBus>,
    /// External asset host client for profile pictures and resumes.
    pub assets: Arc<AssetStore>,
    /// Outbound mailer; `None` when SMTP is not configured.
    pub mailer: Option<Arc<EmailDelivery>>,
}
