//! HTTP-level integration tests for the auth and admin endpoints.
//!
//! Covers registration, dual-mode credential reading (cookie and header),
//! token classification, password reset, and the admin plan upgrade.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, get, get_with_auth_header, get_with_cookie, post_json, post_with_cookie,
    register_user, session_cookie, SESSION_COOKIE,
};
use folio_api::auth::jwt::{issue_reset_token, issue_session_token, Claims, TokenPurpose};
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Registration creates the account, its default portfolio, and a session.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_creates_account_and_session(pool: PgPool) {
    let app = common::build_test_app(pool);

    let (json, cookie) = register_user(app.clone(), "alice", "alice@test.com", "hunter2pass").await;
    assert_eq!(json["user"]["username"], "alice");
    assert_eq!(json["user"]["email"], "alice@test.com");
    assert_eq!(json["user"]["plan"], "free");
    assert!(json["user"].get("passwordHash").is_none());

    // The session cookie works immediately.
    let response = get_with_cookie(app.clone(), "/auth/me", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["user"]["username"], "alice");

    // The default portfolio exists and is unpublished.
    let response = get_with_cookie(app, "/portfolio", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let portfolio = body_json(response).await;
    assert_eq!(portfolio["isPublished"], false);
}

/// Usernames are trimmed and lowercased before storage.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_normalizes_username(pool: PgPool) {
    let app = common::build_test_app(pool);

    let (json, _cookie) =
        register_user(app, "  CamelCase  ", "camel@test.com", "hunter2pass").await;
    assert_eq!(json["user"]["username"], "camelcase");
}

/// Usernames outside the 3-30 char [a-z0-9_-] alphabet are rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_rejects_invalid_username(pool: PgPool) {
    let app = common::build_test_app(pool);

    for bad in ["ab", "has space", "dots.not.ok", ""] {
        let body = serde_json::json!({
            "username": bad,
            "email": "x@test.com",
            "password": "hunter2pass",
        });
        let response = post_json(app.clone(), "/auth/register", body).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "username '{bad}' must be rejected"
        );
    }
}

/// Duplicate username or email answers 400, not 409.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_duplicate_identity_is_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(app.clone(), "taken", "taken@test.com", "hunter2pass").await;

    let body = serde_json::json!({
        "username": "taken",
        "email": "other@test.com",
        "password": "hunter2pass",
    });
    let response = post_json(app.clone(), "/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = serde_json::json!({
        "username": "someoneelse",
        "email": "taken@test.com",
        "password": "hunter2pass",
    });
    let response = post_json(app, "/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Successful login sets the session cookie and returns the identity.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(app.clone(), "bob", "bob@test.com", "hunter2pass").await;

    let body = serde_json::json!({ "email": "bob@test.com", "password": "hunter2pass" });
    let response = post_json(app, "/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_some());

    let json = body_json(response).await;
    assert_eq!(json["user"]["username"], "bob");
}

/// Wrong password and unknown email produce byte-identical 401 bodies, so
/// the login endpoint cannot be used to probe for accounts.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_failure_does_not_reveal_account_existence(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(app.clone(), "carol", "carol@test.com", "hunter2pass").await;

    let wrong_password = post_json(
        app.clone(),
        "/auth/login",
        serde_json::json!({ "email": "carol@test.com", "password": "incorrect" }),
    )
    .await;
    let unknown_email = post_json(
        app,
        "/auth/login",
        serde_json::json!({ "email": "ghost@test.com", "password": "incorrect" }),
    )
    .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(wrong_password).await,
        body_json(unknown_email).await
    );
}

/// A suspended account cannot log in even with the right password.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_suspended_account(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    register_user(app.clone(), "frozen", "frozen@test.com", "hunter2pass").await;

    sqlx::query("UPDATE users SET status = 'suspended' WHERE username = 'frozen'")
        .execute(&pool)
        .await
        .expect("status update should succeed");

    let body = serde_json::json!({ "email": "frozen@test.com", "password": "hunter2pass" });
    let response = post_json(app, "/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Credential reading
// ---------------------------------------------------------------------------

/// No credential at all answers 401 NO_TOKEN.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_me_without_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NO_TOKEN");
}

/// A garbage token is classified invalid, not expired.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_me_with_garbage_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let cookie = format!("{SESSION_COOKIE}=not-a-jwt");
    let response = get_with_cookie(app, "/auth/me", &cookie).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "TOKEN_INVALID");
}

/// An expired session token is classified expired so the client can prompt
/// re-login instead of treating the session as forged.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_me_with_expired_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let config = common::test_jwt_config();

    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: 1,
        username: "alice".to_string(),
        purpose: TokenPurpose::Session,
        exp: now - 300,
        iat: now - 600,
        jti: "expired-test-token".to_string(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .expect("encoding should succeed");

    let cookie = format!("{SESSION_COOKIE}={token}");
    let response = get_with_cookie(app, "/auth/me", &cookie).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "TOKEN_EXPIRED");
}

/// A valid token whose subject no longer exists answers 404 USER_NOT_FOUND.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_me_with_orphaned_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let config = common::test_jwt_config();

    let token = issue_session_token(999_999, "ghost", &config).expect("issue should succeed");
    let cookie = format!("{SESSION_COOKIE}={token}");

    let response = get_with_cookie(app, "/auth/me", &cookie).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "USER_NOT_FOUND");
}

/// The bearer header works as a fallback credential, with or without the
/// `Bearer ` prefix.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_me_with_bearer_header(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, cookie) = register_user(app.clone(), "dave", "dave@test.com", "hunter2pass").await;
    let token = cookie
        .strip_prefix(&format!("{SESSION_COOKIE}="))
        .unwrap()
        .to_string();

    let response = get_with_auth_header(app.clone(), "/auth/me", &format!("Bearer {token}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_with_auth_header(app, "/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// When both carriers are present the cookie wins, even if the header
/// carries a different valid identity.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_cookie_takes_precedence_over_header(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, alice_cookie) =
        register_user(app.clone(), "alice", "alice@test.com", "hunter2pass").await;
    let (_, bob_cookie) = register_user(app.clone(), "bob", "bob@test.com", "hunter2pass").await;
    let bob_token = bob_cookie
        .strip_prefix(&format!("{SESSION_COOKIE}="))
        .unwrap()
        .to_string();

    let request = axum::http::Request::builder()
        .uri("/auth/me")
        .header(axum::http::header::COOKIE, &alice_cookie)
        .header(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {bob_token}"),
        )
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request)
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["username"], "alice");
}

/// Logout replaces the session cookie with an empty removal cookie.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_logout_clears_cookie(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, cookie) = register_user(app.clone(), "eve", "eve@test.com", "hunter2pass").await;

    let response = post_with_cookie(app, "/auth/logout", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cleared = session_cookie(&response).expect("logout must set a removal cookie");
    assert_eq!(cleared, format!("{SESSION_COOKIE}="));
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

/// Forgot-password answers 200 whether or not the address is registered.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_forgot_password_never_reveals_accounts(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(app.clone(), "kim", "kim@test.com", "hunter2pass").await;

    let known = post_json(
        app.clone(),
        "/auth/forgot-password",
        serde_json::json!({ "email": "kim@test.com" }),
    )
    .await;
    let unknown = post_json(
        app,
        "/auth/forgot-password",
        serde_json::json!({ "email": "nobody@test.com" }),
    )
    .await;

    assert_eq!(known.status(), StatusCode::OK);
    assert_eq!(unknown.status(), StatusCode::OK);
    assert_eq!(body_json(known).await, body_json(unknown).await);
}

/// A reset token changes the password; old credentials stop working.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_reset_password_flow(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (json, _) = register_user(app.clone(), "lena", "lena@test.com", "oldpassword1").await;
    let user_id = json["user"]["id"].as_i64().expect("user id");

    let token =
        issue_reset_token(user_id, "lena", &common::test_jwt_config()).expect("issue reset token");
    let response = post_json(
        app.clone(),
        "/auth/reset-password",
        serde_json::json!({ "token": token, "newPassword": "newpassword2" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let old = post_json(
        app.clone(),
        "/auth/login",
        serde_json::json!({ "email": "lena@test.com", "password": "oldpassword1" }),
    )
    .await;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let new = post_json(
        app,
        "/auth/login",
        serde_json::json!({ "email": "lena@test.com", "password": "newpassword2" }),
    )
    .await;
    assert_eq!(new.status(), StatusCode::OK);
}

/// A plain session token cannot be replayed as a reset credential.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_session_token_rejected_for_reset(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, cookie) = register_user(app.clone(), "mia", "mia@test.com", "hunter2pass").await;
    let session_token = cookie
        .strip_prefix(&format!("{SESSION_COOKIE}="))
        .unwrap()
        .to_string();

    let response = post_json(
        app,
        "/auth/reset-password",
        serde_json::json!({ "token": session_token, "newPassword": "newpassword2" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// The configured administrator can upgrade a plan; everyone else gets 403.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_confirm_payment_requires_admin(pool: PgPool) {
    let app = common::build_test_app(pool);
    // test_config() pins ADMIN_EMAIL to admin@test.com.
    let (_, admin_cookie) =
        register_user(app.clone(), "root", "admin@test.com", "hunter2pass").await;
    let (_, user_cookie) = register_user(app.clone(), "nina", "nina@test.com", "hunter2pass").await;

    let response =
        post_with_cookie(app.clone(), "/admin/users/nina/confirm-payment", &user_cookie).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response =
        post_with_cookie(app.clone(), "/admin/users/nina/confirm-payment", &admin_cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["plan"], "premium");

    // Unknown usernames answer 404.
    let response = post_with_cookie(app, "/admin/users/ghost/confirm-payment", &admin_cookie).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
