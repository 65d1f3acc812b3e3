//! # Shopfloor API
//!
//! axum HTTP server for the multi-tenant POS backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         API Routes                                      │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  users         │  │  stores        │  │  store-scoped (store-id)   ││
//! │  │                │  │                │  │                            ││
//! │  │ • register     │  │ • create       │  │ • /categories              ││
//! │  │ • login        │  │ • list / get   │  │ • /products                ││
//! │  │ • refresh-token│  │ • update       │  │ • /sales  ★ atomic sale    ││
//! │  │ • logout       │  │ • delete       │  │                            ││
//! │  │ • super admin  │  │ • members      │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  Every protected route: bearer token → StoreScope → authorize(op)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_PORT` - listen port (default: 8080)
//! - `DATABASE_PATH` - SQLite file (default: ./shopfloor.db)
//! - `DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_ACCESS_LIFETIME_SECS` - Access token lifetime (default: 900)
//! - `JWT_REFRESH_LIFETIME_SECS` - Refresh token lifetime (default: 604800)
//! - `SUPER_ADMIN_SECRET` - enables the `x-super-admin-secret` header
//! - `COOKIE_SECURE` - mark the refresh cookie `Secure` (default: false)

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod response;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Builds the full router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::users::router())
        .merge(routes::stores::router())
        .merge(routes::categories::router())
        .merge(routes::products::router())
        .merge(routes::sales::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
