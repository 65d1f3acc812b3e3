//! Session configuration.

use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_REFRESH_PATH: &str = "/users/refresh-token";

/// Where the API lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// API root, e.g. `https://pos.example.com`.
    pub base_url: String,
    /// Renewal endpoint, relative to `base_url`.
    pub refresh_path: String,
    /// Per-request timeout, renewal included.
    pub request_timeout: Duration,
}

impl SessionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        SessionConfig {
            base_url: base_url.into(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Reads `SHOPFLOOR_API_URL`, falling back to the local default.
    pub fn from_env() -> Self {
        Self::new(std::env::var("SHOPFLOOR_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()))
    }

    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Joins `path` onto the base URL with exactly one slash.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn refresh_url(&self) -> String {
        self.url(&self.refresh_path)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let config = SessionConfig::new("http://api.local/");
        assert_eq!(config.url("/sales"), "http://api.local/sales");
        assert_eq!(config.url("sales"), "http://api.local/sales");
        assert_eq!(config.refresh_url(), "http://api.local/users/refresh-token");
    }
}
