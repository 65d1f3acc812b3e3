//! Request extractors.
//!
//! ## Access Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Authorization: Bearer <jwt>                                           │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  AuthUser        access token valid, user exists and is not deleted    │
//! │        │                                                                │
//! │        ▼  store-id header                                               │
//! │  StoreContext    StoreAccessResolver → StoreScope (fresh per request)  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  handler         ctx.authorize(Operation::…) before touching storage   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;

use shopfloor_core::authz::{authorize, Operation};
use shopfloor_core::{CoreError, StoreScope, User};

use crate::auth::extract_bearer_token;
use crate::error::ApiError;
use crate::state::AppState;

/// Header naming the store a request acts on.
pub const STORE_ID_HEADER: &str = "store-id";

/// Header carrying the configured super admin secret.
pub const SUPER_ADMIN_SECRET_HEADER: &str = "x-super-admin-secret";

/// JSON body whose rejection renders as the API error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token)
}

// =============================================================================
// AuthUser
// =============================================================================

/// The authenticated user behind the bearer token.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".into()))?;

        let claims = state.jwt.validate_access_token(token)?;

        let user = state
            .db
            .users()
            .get_by_id(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("User no longer exists".into()))?;

        Ok(AuthUser(user))
    }
}

// =============================================================================
// StoreContext
// =============================================================================

/// An authenticated user bound to the store named by the `store-id` header.
pub struct StoreContext {
    pub user: User,
    pub scope: StoreScope,
}

impl StoreContext {
    /// Resolves `store_id` for `user`. Used directly by routes that carry the
    /// store in the path.
    pub async fn resolve(state: &AppState, user: User, store_id: Option<&str>) -> Result<Self, ApiError> {
        let scope = state.db.access().resolve_scope(&user.id, store_id).await?;
        Ok(StoreContext { user, scope })
    }

    pub fn store_id(&self) -> &str {
        &self.scope.store_id
    }

    /// Role gate for one operation.
    pub fn authorize(&self, operation: Operation) -> Result<(), ApiError> {
        authorize(operation, &self.scope).map_err(|e| {
            warn!(
                user_id = %self.scope.user_id,
                store_id = %self.scope.store_id,
                role = ?self.scope.role,
                operation = operation.name(),
                "Operation denied"
            );
            ApiError::from(e)
        })
    }
}

impl FromRequestParts<AppState> for StoreContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        let claimed = parts
            .headers
            .get(STORE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        StoreContext::resolve(state, user, claimed.as_deref()).await
    }
}

// =============================================================================
// SuperAdminAccess
// =============================================================================

/// Platform operator: either the configured `x-super-admin-secret` header, or
/// a bearer token issued by the super admin login.
pub struct SuperAdminAccess;

impl FromRequestParts<AppState> for SuperAdminAccess {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(SUPER_ADMIN_SECRET_HEADER)
            .and_then(|value| value.to_str().ok());

        if let (Some(presented), Some(expected)) = (presented, state.config.super_admin_secret.as_deref()) {
            if presented == expected {
                return Ok(SuperAdminAccess);
            }
        }

        if let Some(token) = bearer_token(parts) {
            if state.jwt.validate_super_admin_token(token).is_ok() {
                return Ok(SuperAdminAccess);
            }
        }

        warn!(path = %parts.uri.path(), "Super admin access denied");
        Err(CoreError::access_denied("super admin only").into())
    }
}
