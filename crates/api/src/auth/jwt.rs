//! Stateless session token issue/verify.
//!
//! Tokens are HS256-signed JWTs. The store holds no session table: validity
//! is proven solely by signature and expiry. Every token carries a purpose
//! tag so a 7-day session token can never be replayed as a 1-hour
//! password-reset credential.

use folio_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a token is allowed to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Ordinary authenticated session (7 days).
    Session,
    /// One-shot password reset credential (1 hour).
    PasswordReset,
}

/// JWT claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// The user's immutable lowercase username.
    pub username: String,
    /// Purpose tag; consumers must check this before honoring the token.
    pub purpose: TokenPurpose,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4) for audit.
    pub jti: String,
}

/// Why a token was rejected.
///
/// `Expired` is kept distinct so the client can prompt re-login instead of
/// treating the session as forged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Session token lifetime in days (default: 7).
    pub session_expiry_days: i64,
    /// Password-reset token lifetime in minutes (default: 60).
    pub reset_expiry_mins: i64,
}

/// Default session expiry in days.
const DEFAULT_SESSION_EXPIRY_DAYS: i64 = 7;
/// Default password-reset expiry in minutes.
const DEFAULT_RESET_EXPIRY_MINS: i64 = 60;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var               | Required | Default |
    /// |-----------------------|----------|---------|
    /// | `JWT_SECRET`          | **yes**  | --      |
    /// | `SESSION_EXPIRY_DAYS` | no       | `7`     |
    /// | `RESET_EXPIRY_MINS`   | no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let session_expiry_days: i64 = std::env::var("SESSION_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_SESSION_EXPIRY_DAYS.to_string())
            .parse()
            .expect("SESSION_EXPIRY_DAYS must be a valid i64");

        let reset_expiry_mins: i64 = std::env::var("RESET_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_RESET_EXPIRY_MINS.to_string())
            .parse()
            .expect("RESET_EXPIRY_MINS must be a valid i64");

        Self {
            secret,
            session_expiry_days,
            reset_expiry_mins,
        }
    }
}

/// Generate an HS256 session token for the given user (7-day expiry).
pub fn issue_session_token(
    user_id: DbId,
    username: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    issue(
        user_id,
        username,
        TokenPurpose::Session,
        config.session_expiry_days * 24 * 60 * 60,
        config,
    )
}

/// Generate an HS256 password-reset token for the given user (1-hour expiry).
pub fn issue_reset_token(
    user_id: DbId,
    username: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    issue(
        user_id,
        username,
        TokenPurpose::PasswordReset,
        config.reset_expiry_mins * 60,
        config,
    )
}

fn issue(
    user_id: DbId,
    username: &str,
    purpose: TokenPurpose,
    ttl_secs: i64,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        purpose,
        exp: now + ttl_secs,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode a token, returning the embedded [`Claims`].
///
/// Signature and expiry failures are classified: an otherwise-correct
/// signature with a passed expiry is always [`TokenError::Expired`], never
/// silently accepted; everything else is [`TokenError::Invalid`].
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, TokenError> {
    // HS256, validates exp. Expiry is exact: the default 60-second leeway
    // would accept a token for a minute past its expiry.
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to build a test config with a known secret.
    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            session_expiry_days: 7,
            reset_expiry_mins: 60,
        }
    }

    #[test]
    fn session_token_round_trips() {
        let config = test_config();
        let token = issue_session_token(42, "alice", &config)
            .expect("token generation should succeed");

        let claims = verify_token(&token, &config).expect("token validation should succeed");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.purpose, TokenPurpose::Session);
        assert!(claims.exp > claims.iat);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn reset_token_carries_reset_purpose() {
        let config = test_config();
        let token =
            issue_reset_token(7, "bob", &config).expect("token generation should succeed");

        let claims = verify_token(&token, &config).expect("token validation should succeed");
        assert_eq!(claims.purpose, TokenPurpose::PasswordReset);
        // One hour, not seven days.
        assert_eq!(claims.exp - claims.iat, 60 * 60);
    }

    /// Encode a token with an expiry `ttl_secs` from now (negative for an
    /// already-expired token).
    fn token_with_ttl(ttl_secs: i64, config: &JwtConfig) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            username: "alice".to_string(),
            purpose: TokenPurpose::Session,
            exp: now + ttl_secs,
            iat: now - 600,
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .expect("encoding should succeed")
    }

    #[test]
    fn expired_token_is_classified_expired() {
        let config = test_config();
        let token = token_with_ttl(-300, &config); // expired 5 minutes ago

        assert_eq!(verify_token(&token, &config), Err(TokenError::Expired));
    }

    #[test]
    fn expiry_is_exact_with_no_grace_window() {
        let config = test_config();
        // One second past expiry must already be rejected; a leeway-based
        // validation would still accept this token.
        let token = token_with_ttl(-1, &config);

        assert_eq!(verify_token(&token, &config), Err(TokenError::Expired));

        // Thirty seconds past expiry, squarely inside a 60-second grace
        // window if one existed.
        let token = token_with_ttl(-30, &config);

        assert_eq!(verify_token(&token, &config), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_token_is_classified_invalid() {
        let config = test_config();
        assert_eq!(
            verify_token("not-a-jwt-at-all", &config),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn wrong_secret_is_classified_invalid() {
        let config_a = test_config();
        let config_b = JwtConfig {
            secret: "a-completely-different-secret".to_string(),
            ..test_config()
        };

        let token = issue_session_token(1, "alice", &config_a)
            .expect("token generation should succeed");

        assert_eq!(verify_token(&token, &config_b), Err(TokenError::Invalid));
    }
}
