//! Store-scoped categories (`store-id` header).

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::Router;
use serde::Deserialize;
use serde_json::json;

use shopfloor_core::authz::Operation;

use crate::error::ApiResult;
use crate::extract::{ApiJson, StoreContext};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", put(update_category).delete(delete_category))
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

async fn list_categories(State(state): State<AppState>, ctx: StoreContext) -> ApiResult<impl IntoResponse> {
    ctx.authorize(Operation::ViewCategories)?;

    let categories = state.db.categories().list(ctx.store_id()).await?;
    Ok(ApiResponse::ok(categories, "Categories fetched successfully"))
}

async fn create_category(
    State(state): State<AppState>,
    ctx: StoreContext,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    ctx.authorize(Operation::CreateCategory)?;

    let category = state.db.categories().create(ctx.store_id(), &body.name).await?;
    Ok(ApiResponse::created(category, "Category created successfully"))
}

async fn update_category(
    State(state): State<AppState>,
    ctx: StoreContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    ctx.authorize(Operation::UpdateCategory)?;

    let category = state
        .db
        .categories()
        .update(ctx.store_id(), &id, &body.name)
        .await?;
    Ok(ApiResponse::ok(category, "Category updated successfully"))
}

async fn delete_category(
    State(state): State<AppState>,
    ctx: StoreContext,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    ctx.authorize(Operation::DeleteCategory)?;

    state.db.categories().soft_delete(ctx.store_id(), &id).await?;
    Ok(ApiResponse::ok(json!({ "id": id }), "Category deleted successfully"))
}
