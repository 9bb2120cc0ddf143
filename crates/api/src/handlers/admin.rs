//! Handlers for the `/admin` resource.

use axum::extract::{Path, State};
use axum::Json;
use folio_core::{account, error::CoreError, handle};
use folio_db::models::user::IdentityProjection;
use folio_db::repositories::UserRepo;

use crate::error::AppResult;
use crate::handlers::auth::UserEnvelope;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /admin/users/{username}/confirm-payment
///
/// Upgrade an account to the premium plan after an out-of-band payment.
/// Restricted to the configured administrator address.
pub async fn confirm_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<UserEnvelope>> {
    let is_admin = state
        .config
        .admin_email
        .as_deref()
        .is_some_and(|admin| auth.user.email.eq_ignore_ascii_case(admin));
    if !is_admin {
        return Err(CoreError::Forbidden("Administrator access required".into()).into());
    }

    let username = handle::normalize(&username);
    let user = UserRepo::set_plan(&state.pool, &username, account::PLAN_PREMIUM)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            key: username.clone(),
        })?;

    // The plan change must be visible on the next identity read.
    state.identity_cache.delete(user.id).await;

    tracing::info!(username = %username, "Payment confirmed, plan upgraded");

    Ok(Json(UserEnvelope {
        user: IdentityProjection::from(&user),
    }))
}
