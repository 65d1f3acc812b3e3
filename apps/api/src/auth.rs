//! JWT authentication module.
//!
//! Handles JWT token generation and validation, plus the refresh cookie.
//!
//! ## Token Types
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  access       Authorization: Bearer …   short-lived, every request      │
//! │  refresh      refreshToken cookie       long-lived, HttpOnly, rotated   │
//! │               (also stored on the user row; only the stored one works) │
//! │  super_admin  Authorization: Bearer …   platform operator operations    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use shopfloor_core::CoreError;

pub const ACCESS_TOKEN: &str = "access";
pub const REFRESH_TOKEN: &str = "refresh";
pub const SUPER_ADMIN_TOKEN: &str = "super_admin";

/// Name of the cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id, or super admin id)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,

    /// Token type ("access", "refresh" or "super_admin")
    pub token_type: String,
}

/// JWT token manager.
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_lifetime_secs: i64,
    refresh_lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: &str, access_lifetime_secs: i64, refresh_lifetime_secs: i64) -> Self {
        JwtManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_lifetime_secs,
            refresh_lifetime_secs,
        }
    }

    pub fn refresh_lifetime_secs(&self) -> i64 {
        self.refresh_lifetime_secs
    }

    fn issue(&self, subject: &str, token_type: &str, lifetime_secs: i64) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(lifetime_secs);

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("Failed to generate {} token: {}", token_type, e)))
    }

    /// Generate an access token.
    pub fn generate_access_token(&self, user_id: &str) -> Result<String, ApiError> {
        self.issue(user_id, ACCESS_TOKEN, self.access_lifetime_secs)
    }

    /// Generate a refresh token.
    pub fn generate_refresh_token(&self, user_id: &str) -> Result<String, ApiError> {
        self.issue(user_id, REFRESH_TOKEN, self.refresh_lifetime_secs)
    }

    /// Generate a super admin token (access lifetime).
    pub fn generate_super_admin_token(&self, admin_id: &str) -> Result<String, ApiError> {
        self.issue(admin_id, SUPER_ADMIN_TOKEN, self.access_lifetime_secs)
    }

    /// Validate and decode a token.
    ///
    /// An expired token is `AuthExpired`; anything else wrong is `Unauthorized`.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let token_data: TokenData<Claims> = decode(token, &self.decoding, &Validation::default())
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => ApiError::Core(CoreError::AuthExpired),
                _ => ApiError::Unauthorized(format!("Invalid token: {}", e)),
            })?;

        Ok(token_data.claims)
    }

    fn validate_typed(&self, token: &str, expected: &str) -> Result<Claims, ApiError> {
        let claims = self.validate_token(token)?;

        if claims.token_type != expected {
            return Err(ApiError::Unauthorized(format!("Expected {} token", expected)));
        }

        Ok(claims)
    }

    /// Validate that a token is an access token.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, ApiError> {
        self.validate_typed(token, ACCESS_TOKEN)
    }

    /// Validate that a token is a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, ApiError> {
        self.validate_typed(token, REFRESH_TOKEN)
    }

    /// Validate that a token is a super admin token.
    pub fn validate_super_admin_token(&self, token: &str) -> Result<Claims, ApiError> {
        self.validate_typed(token, SUPER_ADMIN_TOKEN)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// `Set-Cookie` value carrying the refresh token.
pub fn refresh_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Strict",
        REFRESH_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the refresh cookie.
pub fn clear_refresh_cookie(secure: bool) -> String {
    refresh_cookie("", 0, secure)
}

/// Reads a cookie from the request's `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use shopfloor_core::ErrorKind;

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret", 3600, 86400);

        let access_token = manager.generate_access_token("user-001").unwrap();
        let claims = manager.validate_access_token(&access_token).unwrap();

        assert_eq!(claims.sub, "user-001");
        assert_eq!(claims.token_type, ACCESS_TOKEN);
    }

    #[test]
    fn test_refresh_tokens_are_unique() {
        let manager = JwtManager::new("test-secret", 3600, 86400);

        let first = manager.generate_refresh_token("user-001").unwrap();
        let second = manager.generate_refresh_token("user-001").unwrap();
        assert_ne!(first, second);
        assert_eq!(manager.validate_refresh_token(&first).unwrap().token_type, REFRESH_TOKEN);
    }

    #[test]
    fn test_wrong_token_type() {
        let manager = JwtManager::new("test-secret", 3600, 86400);

        let access_token = manager.generate_access_token("user-001").unwrap();

        // Try to validate access token as refresh token
        assert!(manager.validate_refresh_token(&access_token).is_err());
        assert!(manager.validate_super_admin_token(&access_token).is_err());
    }

    #[test]
    fn test_expired_token_is_auth_expired() {
        // Past the default 60s leeway
        let manager = JwtManager::new("test-secret", -120, 86400);

        let token = manager.generate_access_token("user-001").unwrap();
        let err = manager.validate_access_token(&token).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthExpired);
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let ours = JwtManager::new("test-secret", 3600, 86400);
        let theirs = JwtManager::new("other-secret", 3600, 86400);

        let token = theirs.generate_access_token("user-001").unwrap();
        assert!(matches!(ours.validate_access_token(&token), Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; refreshToken=tok-1"));

        assert_eq!(read_cookie(&headers, REFRESH_COOKIE), Some("tok-1"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = refresh_cookie("tok", 60, true);
        assert!(cookie.starts_with("refreshToken=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("; Secure"));
        assert!(clear_refresh_cookie(false).contains("Max-Age=0"));
    }
}
