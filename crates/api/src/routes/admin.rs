//! Route definitions for the `/admin` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// POST /users/{username}/confirm-payment -> confirm_payment (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/users/{username}/confirm-payment",
        post(admin::confirm_payment),
    )
}
