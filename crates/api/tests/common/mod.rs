#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use folio_api::assets::AssetStore;
use folio_api::auth::jwt::JwtConfig;
use folio_api::cache::IdentityCache;
use folio_api::config::ServerConfig;
use folio_api::routes;
use folio_api::state::AppState;
use folio_api::ws::RoomRegistry;
use folio_events::EventBus;

/// Session cookie name, matching the extractor.
pub const SESSION_COOKIE: &str = "folio_session";

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
///
/// `admin_email` is set so the admin surface can be exercised.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        cookie_secure: false,
        public_app_url: "http://localhost:5173".to_string(),
        admin_email: Some("admin@test.com".to_string()),
        jwt: test_jwt_config(),
    }
}

/// JWT config shared by tests that need to mint tokens directly.
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-0123456789".to_string(),
        session_expiry_days: 7,
        reset_expiry_mins: 60,
    }
}

/// Build the shared application state over the given pool.
///
/// The asset store is unconfigured (uploads fail with an upstream error)
/// and no mailer is attached; tests needing the room registry or event bus
/// reach them through the returned state.
pub fn build_test_state(pool: PgPool) -> AppState {
    AppState {
        pool,
        config: Arc::new(test_config()),
        rooms: Arc::new(RoomRegistry::new()),
        identity_cache: Arc::new(IdentityCache::new()),
        event_bus: Arc::new(EventBus::default()),
        assets: Arc::new(AssetStore::new(None)),
        mailer: None,
    }
}

/// Build the full application router over prebuilt state.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app_with_state(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::router())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Build the full application router with default test state.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_state(build_test_state(pool))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should complete")
}

/// GET without credentials.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// GET with a session cookie.
pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// GET with an `Authorization` header value (e.g. `Bearer <token>`).
pub async fn get_with_auth_header(app: Router, uri: &str, value: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, value)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST a JSON body without credentials.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST a JSON body with a session cookie.
pub async fn post_json_with_cookie(
    app: Router,
    uri: &str,
    cookie: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST without a body, with a session cookie.
pub async fn post_with_cookie(app: Router, uri: &str, cookie: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// PUT a multipart form with a session cookie.
pub async fn put_multipart(
    app: Router,
    uri: &str,
    cookie: &str,
    form: MultipartForm,
) -> Response<Body> {
    let (content_type, body) = form.finish();
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(CONTENT_TYPE, content_type)
        .header(COOKIE, cookie)
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Collect and parse a JSON response body.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Extract the `folio_session=<value>` pair from a response's Set-Cookie
/// headers, ready to send back in a `Cookie` header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(SESSION_COOKIE))
        .map(|v| v.split(';').next().unwrap_or(v).to_string())
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

/// Register an account through the API; returns the response JSON and the
/// session cookie from Set-Cookie.
pub async fn register_user(
    app: Router,
    username: &str,
    email: &str,
    password: &str,
) -> (serde_json::Value, String) {
    let body = serde_json::json!({
        "username": username,
        "email": email,
        "password": password,
    });
    let response = post_json(app, "/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let cookie = session_cookie(&response).expect("register must set the session cookie");
    let json = body_json(response).await;
    (json, cookie)
}

// ---------------------------------------------------------------------------
// Multipart form builder
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "----folio-test-boundary";

/// Minimal multipart/form-data body builder for save requests.
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self { body: Vec::new() }
    }

    /// Append a text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    /// Append a JSON-encoded text field.
    pub fn json(self, name: &str, value: serde_json::Value) -> Self {
        let encoded = value.to_string();
        self.text(name, &encoded)
    }

    /// Append a file field.
    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Close the form, returning the Content-Type header value and body.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (
            format!("multipart/form-data; boundary={BOUNDARY}"),
            self.body,
        )
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}
