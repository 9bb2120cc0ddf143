//! Handlers for the `/auth` resource (register, login, logout, me,
//! forgot/reset password).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use folio_core::{account, error::CoreError, handle};
use folio_db::models::user::{CreateUser, IdentityProjection};
use folio_db::repositories::{PortfolioRepo, UserRepo};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::jwt::{issue_reset_token, issue_session_token, verify_token, TokenPurpose};
use crate::auth::password::{
    dummy_verify, hash_password, validate_password_strength, verify_password,
};
use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, SESSION_COOKIE};
use crate::state::AppState;

/// Message returned for both unknown email and wrong password, so the
/// response shape never reveals whether the account exists.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
///
/// Fields are optional so missing ones can be answered with a field-level
/// 400 instead of a body-rejection status.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for `POST /auth/forgot-password`.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

/// Request body for `POST /auth/reset-password`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub new_password: Option<String>,
}

/// `{ "user": ... }` envelope returned by register, login, and me.
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: IdentityProjection,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/register
///
/// Create the account and its default portfolio, then start a session.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<UserEnvelope>)> {
    let username = handle::normalize(&required(input.username, "username")?);
    handle::validate(&username).map_err(CoreError::Validation)?;

    let email = required(input.email, "email")?;
    let password = required(input.password, "password")?;
    validate_password_strength(&password).map_err(CoreError::Validation)?;

    // Identity collisions answer 400 (not 409) per the public contract.
    if UserRepo::find_by_username(&state.pool, &username)
        .await?
        .is_some()
    {
        return Err(CoreError::Validation("Username is already taken".into()).into());
    }
    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(CoreError::Validation("Email is already registered".into()).into());
    }

    let password_hash = hash_password(&password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: username.clone(),
            email,
            password_hash,
        },
    )
    .await?;

    // Every identity owns exactly one portfolio, created here and private
    // until its owner publishes.
    let display_name = input.display_name.unwrap_or_default();
    PortfolioRepo::create_default(&state.pool, &username, &display_name).await?;

    tracing::info!(user_id = user.id, username = %username, "User registered");

    let token = issue_session_token(user.id, &user.username, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let jar = jar.add(session_cookie(token, &state.config));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(UserEnvelope {
            user: IdentityProjection::from(&user),
        }),
    ))
}

/// POST /auth/login
///
/// Authenticate with email + password and start a session.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<UserEnvelope>)> {
    let email = required(input.email, "email")?;
    let password = required(input.password, "password")?;

    let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? else {
        // Burn a hash verification so the unknown-email path takes as long
        // as a wrong-password one.
        dummy_verify(&password);
        return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.into()).into());
    };

    let password_valid = verify_password(&password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.into()).into());
    }

    if user.status != account::STATUS_ACTIVE {
        return Err(CoreError::Unauthorized("Account is not active".into()).into());
    }

    UserRepo::record_login(&state.pool, user.id).await?;

    let token = issue_session_token(user.id, &user.username, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let jar = jar.add(session_cookie(token, &state.config));

    Ok((
        jar,
        Json(UserEnvelope {
            user: IdentityProjection::from(&user),
        }),
    ))
}

/// POST /auth/logout
///
/// Clear the session cookie. The token itself is stateless, so clearing
/// the cookie is the entire logout.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    (
        jar.remove(removal),
        Json(json!({ "message": "Logged out" })),
    )
}

/// GET /auth/me
///
/// Return the caller's identity projection, read through the identity
/// cache. The authenticator has already done a fresh store lookup for the
/// security check; this cache only saves the projection-building work for
/// repeated "who am I" polls and may be stale for up to one epoch.
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Json<UserEnvelope> {
    if let Some(hit) = state.identity_cache.get(auth.user.id).await {
        return Json(UserEnvelope { user: hit });
    }

    let projection = IdentityProjection::from(&auth.user);
    state
        .identity_cache
        .put(auth.user.id, projection.clone())
        .await;
    Json(UserEnvelope { user: projection })
}

/// POST /auth/forgot-password
///
/// Always answers 200 so the endpoint cannot be used to probe for
/// registered addresses. When the address matches, a one-hour
/// reset-purpose token is issued and mailed.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(input): Json<ForgotPasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let email = required(input.email, "email")?;

    if let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? {
        let token = issue_reset_token(user.id, &user.username, &state.config.jwt)
            .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
        let reset_link = format!(
            "{}/reset-password?token={token}",
            state.config.public_app_url
        );

        match &state.mailer {
            Some(mailer) => {
                if let Err(e) = mailer
                    .send_password_reset(&user.email, &user.username, &reset_link)
                    .await
                {
                    // Still answer 200: an SMTP hiccup must not leak
                    // account existence either.
                    tracing::error!(error = %e, "Failed to send password reset email");
                }
            }
            None => {
                tracing::debug!(username = %user.username, %reset_link, "SMTP not configured, reset link issued but not mailed");
            }
        }
    }

    Ok(Json(json!({
        "message": "If that email is registered, a reset link has been sent"
    })))
}

/// POST /auth/reset-password
///
/// Consume a reset-purpose token and set a new password. Any token that is
/// expired, forged, or carries the wrong purpose tag (e.g. a plain session
/// token being replayed) answers 400.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let token = required(input.token, "token")?;
    let new_password = required(input.new_password, "newPassword")?;
    validate_password_strength(&new_password).map_err(CoreError::Validation)?;

    let claims = verify_token(&token, &state.config.jwt)
        .map_err(|_| CoreError::Validation("Invalid or expired reset token".into()))?;
    if claims.purpose != TokenPurpose::PasswordReset {
        return Err(CoreError::Validation("Invalid or expired reset token".into()).into());
    }

    let user = UserRepo::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(|| CoreError::Validation("Invalid or expired reset token".into()))?;

    let password_hash = hash_password(&new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &password_hash).await?;

    // Force the next "who am I" read to see fresh state.
    state.identity_cache.delete(user.id).await;

    tracing::info!(user_id = user.id, "Password reset completed");

    Ok(Json(json!({ "message": "Password has been reset" })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Presence check producing a field-level 400.
fn required(field: Option<String>, name: &str) -> AppResult<String> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CoreError::Validation(format!("'{name}' is required")).into()),
    }
}

/// Build the session cookie: httpOnly, 7-day Max-Age, `Secure` +
/// `SameSite=None` behind `COOKIE_SECURE`, `SameSite=Lax` otherwise.
fn session_cookie(token: String, config: &ServerConfig) -> Cookie<'static> {
    let builder = Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .path("/")
        .max_age(time::Duration::days(config.jwt.session_expiry_days));

    if config.cookie_secure {
        builder.secure(true).same_site(SameSite::None).build()
    } else {
        builder.same_site(SameSite::Lax).build()
    }
}
