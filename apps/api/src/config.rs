//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;

const DEV_JWT_SECRET: &str = "shopfloor-dev-secret-change-in-production";

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// JWT refresh token lifetime in seconds (also the cookie Max-Age)
    pub jwt_refresh_lifetime_secs: i64,

    /// Shared secret for the `x-super-admin-secret` header. Unset disables it.
    pub super_admin_secret: Option<String>,

    /// Adds `Secure` to the refresh cookie (set behind HTTPS)
    pub cookie_secure: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            http_port: 8080,
            database_path: "./shopfloor.db".to_string(),
            db_max_connections: 5,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_access_lifetime_secs: 900,
            jwt_refresh_lifetime_secs: 604_800,
            super_admin_secret: None,
            cookie_secure: false,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            http_port: parse_var("HTTP_PORT", defaults.http_port)?,

            database_path: env::var("DATABASE_PATH").unwrap_or(defaults.database_path),

            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,

            // In production this MUST be set via environment variable
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),

            jwt_access_lifetime_secs: parse_var(
                "JWT_ACCESS_LIFETIME_SECS",
                defaults.jwt_access_lifetime_secs,
            )?,

            jwt_refresh_lifetime_secs: parse_var(
                "JWT_REFRESH_LIFETIME_SECS",
                defaults.jwt_refresh_lifetime_secs,
            )?,

            super_admin_secret: env::var("SUPER_ADMIN_SECRET")
                .ok()
                .filter(|secret| !secret.trim().is_empty()),

            cookie_secure: parse_var("COOKIE_SECURE", defaults.cookie_secure)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        if self.jwt_access_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_ACCESS_LIFETIME_SECS".to_string()));
        }
        if self.jwt_refresh_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_REFRESH_LIFETIME_SECS".to_string()));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        Ok(())
    }

    /// Whether the built-in development JWT secret is in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
