pub mod admin;
pub mod auth;
pub mod health;
pub mod portfolio;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the full route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                              service and database health
///
/// /ws                                  WebSocket (room subscriptions)
///
/// /auth/register                       create account + default portfolio
/// /auth/login                          start session (public)
/// /auth/logout                         clear session cookie
/// /auth/me                             caller identity (requires auth)
/// /auth/forgot-password                issue reset token (public)
/// /auth/reset-password                 consume reset token (public)
///
/// /portfolio                           own document (requires auth)
/// /portfolio/update                    whole-document save (PUT, multipart)
/// /portfolio/me/portfolio              own document, legacy path
/// /portfolio/{username}                public read (published only)
///
/// /admin/users/{username}/confirm-payment   plan upgrade (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .nest("/portfolio", portfolio::router())
        .nest("/admin", admin::router())
        .route("/ws", get(ws::ws_handler))
}
