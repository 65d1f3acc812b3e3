//! # shopfloor-session: Client Session for the Shopfloor API
//!
//! Keeps an expiring access token usable across many concurrent calls.
//!
//! ## Renewal Guarantees
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  • At most one renewal in flight per session                           │
//! │  • Calls that hit an expired token during a renewal wait for it        │
//! │  • After a successful renewal each waiting call is replayed once       │
//! │  • A replayed call that is rejected again returns AuthExpired          │
//! │  • A failed renewal fails every waiter with the same error and clears  │
//! │    the local session exactly once                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`coordinator`] - Pure Idle/Refreshing state machine
//! - [`client`] - Session actor, `SessionClient` handle, `Transport` trait
//! - [`http`] - reqwest transport with a cookie jar
//! - [`request`] - Replayable request / response values
//! - [`config`] - Base URL, refresh path, timeout
//! - [`error`] - Session error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopfloor_session::{ApiRequest, SessionClient, SessionConfig};
//!
//! let session = SessionClient::connect(SessionConfig::from_env(), None)?;
//! session.login("owner@shop.io", "correct horse").await?;
//!
//! let products: serde_json::Value = session
//!     .call_data(ApiRequest::get("/products").with_store(store_id))
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod http;
pub mod request;

pub use client::{SessionClient, SessionStatus, Transport};
pub use config::SessionConfig;
pub use coordinator::{ExpiredAction, RefreshCoordinator, RefreshState};
pub use error::{SessionError, SessionResult};
pub use http::HttpTransport;
pub use request::{ApiRequest, ApiResponse, Method};
