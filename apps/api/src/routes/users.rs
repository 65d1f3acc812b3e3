//! User accounts, sessions and super admin operations.
//!
//! ```text
//! POST /users/register          public
//! POST /users/login             public, sets refreshToken cookie
//! POST /users/refresh-token     refreshToken cookie only, rotates it
//! POST /users/logout            bearer
//! PUT  /users/change-password   bearer
//! GET  /users                   super admin
//! PUT  /users/{id}/plan         super admin
//! DELETE /users/{id}            super admin
//! POST /super-admins            super admin
//! POST /super-admins/login      public
//! ```

use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use shopfloor_core::validation::{validate_email, validate_fullname, validate_password};
use shopfloor_core::{Plan, User, ValidationError};
use shopfloor_db::password::{hash_password, verify_password};

use crate::auth::{clear_refresh_cookie, read_cookie, refresh_cookie, REFRESH_COOKIE};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, AuthUser, SuperAdminAccess};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/logout", post(logout))
        .route("/users/change-password", put(change_password))
        .route("/users/refresh-token", post(refresh_token))
        .route("/users/{id}/plan", put(update_plan))
        .route("/users/{id}", delete(delete_user))
        .route("/super-admins", post(create_super_admin))
        .route("/super-admins/login", post(super_admin_login))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub fullname: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlanRequest {
    pub plan: Plan,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid email or password".into())
}

async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_email("email", &body.email)?;
    validate_fullname(&body.fullname)?;
    validate_password(&body.password)?;

    let password_hash = hash_password(&body.password)?;
    let user = state
        .db
        .users()
        .create(&body.email, &body.fullname, &password_hash)
        .await?;

    Ok(ApiResponse::created(user, "User registered successfully"))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .db
        .users()
        .get_by_email(&body.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&body.password, &user.password_hash) {
        warn!(user_id = %user.id, "Login with wrong password");
        return Err(invalid_credentials());
    }

    let access_token = state.jwt.generate_access_token(&user.id)?;
    let refresh_token = state.jwt.generate_refresh_token(&user.id)?;
    state
        .db
        .users()
        .set_refresh_token(&user.id, Some(&refresh_token))
        .await?;

    info!(user_id = %user.id, "User logged in");

    let cookie = refresh_cookie(
        &refresh_token,
        state.jwt.refresh_lifetime_secs(),
        state.config.cookie_secure,
    );
    Ok((
        [(SET_COOKIE, cookie)],
        ApiResponse::ok(LoginResponse { user, access_token }, "Logged in successfully"),
    ))
}

async fn logout(State(state): State<AppState>, AuthUser(user): AuthUser) -> ApiResult<impl IntoResponse> {
    state.db.users().set_refresh_token(&user.id, None).await?;
    info!(user_id = %user.id, "User logged out");

    Ok((
        [(SET_COOKIE, clear_refresh_cookie(state.config.cookie_secure))],
        ApiResponse::ok(json!({}), "Logged out successfully"),
    ))
}

async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    if !verify_password(&body.old_password, &user.password_hash) {
        return Err(ValidationError::InvalidFormat {
            field: "oldPassword".into(),
            reason: "does not match the current password".into(),
        }
        .into());
    }
    validate_password(&body.new_password)?;

    let password_hash = hash_password(&body.new_password)?;
    // Also revokes the stored refresh token: other sessions must sign in again
    state.db.users().update_password_hash(&user.id, &password_hash).await?;

    Ok((
        [(SET_COOKIE, clear_refresh_cookie(state.config.cookie_secure))],
        ApiResponse::ok(json!({}), "Password changed successfully"),
    ))
}

/// Exchanges the refresh cookie for a new access token and rotates the cookie.
///
/// Needs no bearer token: the access token is usually the thing that expired.
async fn refresh_token(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<impl IntoResponse> {
    let presented = read_cookie(&headers, REFRESH_COOKIE)
        .ok_or_else(|| ApiError::Unauthorized("Refresh token missing".into()))?;

    let claims = state
        .jwt
        .validate_refresh_token(presented)
        .map_err(|_| ApiError::Unauthorized("Invalid refresh token".into()))?;

    let next = state.jwt.generate_refresh_token(&claims.sub)?;
    let rotated = state
        .db
        .users()
        .rotate_refresh_token(&claims.sub, presented, &next)
        .await?;

    if !rotated {
        warn!(user_id = %claims.sub, "Refresh token reused or revoked");
        return Err(ApiError::Unauthorized("Refresh token is expired or used".into()));
    }

    let access_token = state.jwt.generate_access_token(&claims.sub)?;
    let cookie = refresh_cookie(&next, state.jwt.refresh_lifetime_secs(), state.config.cookie_secure);

    Ok((
        [(SET_COOKIE, cookie)],
        ApiResponse::ok(TokenResponse { access_token }, "Access token refreshed"),
    ))
}

// =============================================================================
// Super admin
// =============================================================================

async fn list_users(State(state): State<AppState>, _: SuperAdminAccess) -> ApiResult<impl IntoResponse> {
    let users = state.db.users().list().await?;
    Ok(ApiResponse::ok(users, "Users fetched successfully"))
}

async fn update_plan(
    State(state): State<AppState>,
    _: SuperAdminAccess,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdatePlanRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state.db.users().update_plan(&id, body.plan).await?;
    Ok(ApiResponse::ok(user, "Plan updated successfully"))
}

async fn delete_user(
    State(state): State<AppState>,
    _: SuperAdminAccess,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.db.users().soft_delete(&id).await?;
    Ok(ApiResponse::ok(json!({ "id": id }), "User deleted successfully"))
}

async fn create_super_admin(
    State(state): State<AppState>,
    _: SuperAdminAccess,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_email("email", &body.email)?;
    validate_password(&body.password)?;

    let password_hash = hash_password(&body.password)?;
    let admin = state.db.super_admins().create(&body.email, &password_hash).await?;

    Ok(ApiResponse::created(
        json!({ "id": admin.id, "email": admin.email }),
        "Super admin created successfully",
    ))
}

async fn super_admin_login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let admin = state
        .db
        .super_admins()
        .get_by_email(&body.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&body.password, &admin.password_hash) {
        warn!(admin_id = %admin.id, "Super admin login with wrong password");
        return Err(invalid_credentials());
    }

    let access_token = state.jwt.generate_super_admin_token(&admin.id)?;
    info!(admin_id = %admin.id, "Super admin logged in");
    Ok(ApiResponse::ok(TokenResponse { access_token }, "Super admin logged in"))
}
