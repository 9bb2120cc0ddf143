//! Cookie/header dual-mode authentication extractor.
//!
//! Credential extraction is an ordered list of strategies, first non-empty
//! wins: the session cookie is checked before the `Authorization` header,
//! so a cookie is authoritative even when a header is also present. This
//! order is a tested contract (see `tests/auth_api.rs`).
//!
//! The extractor always resolves the token against the credential store
//! with a fresh lookup -- never the identity cache -- so the attached user
//! reflects current suspension/status.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum_extra::extract::cookie::Cookie;
use folio_db::models::user::User;
use folio_db::repositories::UserRepo;

use crate::auth::jwt::{verify_token, TokenError, TokenPurpose};
use crate::error::{AppError, AuthFailure};
use crate::state::AppState;

/// Name of the session cookie set by login/register.
pub const SESSION_COOKIE: &str = "folio_session";

/// Authenticated caller, extracted from the session cookie or a bearer
/// token and resolved to the full non-secret user row.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = auth.user.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Freshly loaded user row (password hash included -- never serialize).
    pub user: User,
}

/// First extraction strategy: the session cookie.
fn cookie_token(parts: &Parts) -> Option<String> {
    for header in parts.headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for cookie in Cookie::split_parse(raw.to_owned()).flatten() {
            if cookie.name() == SESSION_COOKIE && !cookie.value().is_empty() {
                return Some(cookie.value().to_string());
            }
        }
    }
    None
}

/// Second extraction strategy: the `Authorization` header, either
/// `Bearer <token>` or the raw token.
fn header_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    let token = value.strip_prefix("Bearer ").unwrap_or(value);
    Some(token.to_string())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = cookie_token(parts)
            .or_else(|| header_token(parts))
            .ok_or(AuthFailure::NoToken)?;

        let claims = verify_token(&token, &state.config.jwt).map_err(|e| match e {
            TokenError::Expired => AuthFailure::TokenExpired,
            TokenError::Invalid => AuthFailure::TokenInvalid,
        })?;

        // A password-reset token is not a session credential.
        if claims.purpose != TokenPurpose::Session {
            return Err(AuthFailure::TokenInvalid.into());
        }

        let user = UserRepo::find_by_id(&state.pool, claims.sub)
            .await?
            .ok_or(AuthFailure::UserNotFound)?;

        Ok(AuthUser { user })
    }
}
