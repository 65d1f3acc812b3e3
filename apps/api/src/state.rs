//! Shared application state.

use std::sync::Arc;

use shopfloor_db::Database;

use crate::auth::JwtManager;
use crate::config::ApiConfig;

/// Cloned into every handler; everything inside is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(
            &config.jwt_secret,
            config.jwt_access_lifetime_secs,
            config.jwt_refresh_lifetime_secs,
        );

        AppState {
            db,
            jwt: Arc::new(jwt),
            config: Arc::new(config),
        }
    }
}
