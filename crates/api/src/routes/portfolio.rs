//! Route definitions for the `/portfolio` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::portfolio;
use crate::state::AppState;

/// Routes mounted at `/portfolio`.
///
/// The static paths are registered before the `{username}` catch-all so
/// `update` and `me/portfolio` never resolve as usernames.
///
/// ```text
/// GET /                -> get_own (requires auth)
/// PUT /update          -> update (requires auth, multipart)
/// GET /me/portfolio    -> get_own (requires auth, legacy path)
/// GET /{username}      -> get_public
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(portfolio::get_own))
        .route("/update", put(portfolio::update))
        .route("/me/portfolio", get(portfolio::get_own))
        .route("/{username}", get(portfolio::get_public))
}
