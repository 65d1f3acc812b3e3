//! # Session Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Credential                 Transport               Local              │
//! │  ──────────                 ─────────               ─────              │
//! │  AuthExpired                Transport               Closed             │
//! │  RenewalFailed              Status                                     │
//! │                             Decode                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Clone` because one renewal failure is delivered, unchanged, to every
//! call that was waiting on it.

use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The server rejected the access token (HTTP 401).
    ///
    /// Seen by callers only when a call still fails after one renewal.
    #[error("Session expired")]
    AuthExpired,

    /// The refresh credential was rejected or the renewal request failed.
    /// Local credentials have been cleared; the user must sign in again.
    #[error("Session renewal failed, please sign in again: {0}")]
    RenewalFailed(String),

    /// Network-level failure (connect, timeout, TLS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status other than 401.
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not have the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The session actor has stopped.
    #[error("Session closed")]
    Closed,
}

impl SessionError {
    /// Whether the user has to sign in again before anything else works.
    pub fn requires_login(&self) -> bool {
        matches!(self, SessionError::AuthExpired | SessionError::RenewalFailed(_))
    }
}
