//! Store management. The store id comes from the path, not the header.
//!
//! ```text
//! POST   /stores                         any user (plan limit)
//! GET    /stores                         stores the caller owns or belongs to
//! GET    /stores/{id}                    member
//! PUT    /stores/{id}                    admin
//! DELETE /stores/{id}                    owner
//! GET    /stores/{id}/members            member
//! POST   /stores/{id}/members            admin
//! DELETE /stores/{id}/members/{user_id}  admin
//! ```

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::Router;
use serde::Deserialize;
use serde_json::json;

use shopfloor_core::authz::Operation;
use shopfloor_core::Role;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, AuthUser, StoreContext};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stores", get(list_stores).post(create_store))
        .route("/stores/{id}", get(get_store).put(update_store).delete(delete_store))
        .route("/stores/{id}/members", get(list_members).post(add_member))
        .route("/stores/{id}/members/{user_id}", delete(remove_member))
}

#[derive(Debug, Deserialize)]
pub struct StoreNameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub email: String,
    #[serde(default = "default_member_role")]
    pub role: Role,
}

fn default_member_role() -> Role {
    Role::Cashier
}

async fn create_store(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<StoreNameRequest>,
) -> ApiResult<impl IntoResponse> {
    let store = state.db.stores().create(&user.id, &body.name).await?;
    Ok(ApiResponse::created(store, "Store created successfully"))
}

async fn list_stores(State(state): State<AppState>, AuthUser(user): AuthUser) -> ApiResult<impl IntoResponse> {
    let stores = state.db.stores().list_for_user(&user.id).await?;
    Ok(ApiResponse::ok(stores, "Stores fetched successfully"))
}

async fn get_store(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let ctx = StoreContext::resolve(&state, user, Some(&id)).await?;
    ctx.authorize(Operation::ViewStore)?;

    let store = state
        .db
        .stores()
        .get(ctx.store_id())
        .await?
        .ok_or_else(|| ApiError::not_found("Store"))?;
    Ok(ApiResponse::ok(
        json!({ "store": store, "role": ctx.scope.role }),
        "Store fetched successfully",
    ))
}

async fn update_store(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StoreNameRequest>,
) -> ApiResult<impl IntoResponse> {
    let ctx = StoreContext::resolve(&state, user, Some(&id)).await?;
    ctx.authorize(Operation::UpdateStore)?;

    let store = state.db.stores().update_name(ctx.store_id(), &body.name).await?;
    Ok(ApiResponse::ok(store, "Store updated successfully"))
}

async fn delete_store(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let ctx = StoreContext::resolve(&state, user, Some(&id)).await?;
    ctx.authorize(Operation::DeleteStore)?;

    // Admin role is not enough here; the repository also requires the owner
    state.db.stores().soft_delete(ctx.store_id(), &ctx.user.id).await?;
    Ok(ApiResponse::ok(json!({ "id": id }), "Store deleted successfully"))
}

async fn list_members(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let ctx = StoreContext::resolve(&state, user, Some(&id)).await?;
    ctx.authorize(Operation::ViewStore)?;

    let members = state.db.stores().members(ctx.store_id()).await?;
    Ok(ApiResponse::ok(members, "Members fetched successfully"))
}

async fn add_member(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<AddMemberRequest>,
) -> ApiResult<impl IntoResponse> {
    let ctx = StoreContext::resolve(&state, user, Some(&id)).await?;
    ctx.authorize(Operation::ManageMembers)?;

    let member = state
        .db
        .stores()
        .add_member(ctx.store_id(), &body.email, body.role)
        .await?;
    Ok(ApiResponse::created(member, "Member added successfully"))
}

async fn remove_member(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, user_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let ctx = StoreContext::resolve(&state, user, Some(&id)).await?;
    ctx.authorize(Operation::ManageMembers)?;

    state.db.stores().remove_member(ctx.store_id(), &user_id).await?;
    Ok(ApiResponse::ok(json!({ "userId": user_id }), "Member removed successfully"))
}
