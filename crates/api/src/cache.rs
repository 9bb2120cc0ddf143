//! Short-lived identity projection cache for the "who am I" read path.
//!
//! An explicit, injected service object (shared via `Arc` in `AppState`),
//! not module-global state. Invalidation is a coarse epoch: a background
//! sweeper clears the whole map every five minutes instead of tracking
//! per-entry TTLs. The only per-key eviction is [`IdentityCache::delete`],
//! used after a password reset. A profile mutation may therefore be served
//! stale to cache hits for up to one epoch.
//!
//! The security-sensitive authenticator never reads this cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use folio_core::types::DbId;
use folio_db::models::user::IdentityProjection;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Seconds between full-cache clears.
pub const CACHE_EPOCH_SECS: u64 = 300;

/// Process-wide cache of identity projections keyed by user id.
///
/// Thread-safe via interior `RwLock`; races between readers and the epoch
/// sweeper are benign (at worst a stale read or an extra store hit).
pub struct IdentityCache {
    entries: RwLock<HashMap<DbId, IdentityProjection>>,
}

impl IdentityCache {
    /// Create a new, empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached projection for `user_id`, if present.
    pub async fn get(&self, user_id: DbId) -> Option<IdentityProjection> {
        self.entries.read().await.get(&user_id).cloned()
    }

    /// Insert or overwrite the projection for `user_id`.
    pub async fn put(&self, user_id: DbId, projection: IdentityProjection) {
        self.entries.write().await.insert(user_id, projection);
    }

    /// Evict one entry. Used after credential-affecting mutations
    /// (password reset) to force a fresh read next time.
    pub async fn delete(&self, user_id: DbId) {
        self.entries.write().await.remove(&user_id);
    }

    /// Drop every entry unconditionally (the epoch clear).
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Current number of cached entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the background task that clears the whole cache every epoch.
///
/// Runs until `cancel` fires (during graceful shutdown).
pub fn start_cache_sweeper(
    cache: Arc<IdentityCache>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(CACHE_EPOCH_SECS));
        // The first tick fires immediately; clearing an empty cache is fine.
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let dropped = cache.len().await;
                    cache.clear().await;
                    tracing::debug!(dropped, "Identity cache epoch clear");
                }
                _ = cancel.cancelled() => {
                    tracing::info!("Identity cache sweeper shutting down");
                    break;
                }
            }
        }
    })
}
