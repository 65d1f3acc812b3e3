//! Store-scoped products (`store-id` header).

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde_json::json;

use shopfloor_core::authz::Operation;
use shopfloor_core::{NewProduct, ProductUpdate};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, StoreContext};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

async fn list_products(State(state): State<AppState>, ctx: StoreContext) -> ApiResult<impl IntoResponse> {
    ctx.authorize(Operation::ViewProducts)?;

    let products = state.db.products().list(ctx.store_id()).await?;
    Ok(ApiResponse::ok(products, "Products fetched successfully"))
}

async fn get_product(
    State(state): State<AppState>,
    ctx: StoreContext,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    ctx.authorize(Operation::ViewProducts)?;

    let product = state
        .db
        .products()
        .get(ctx.store_id(), &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product"))?;
    Ok(ApiResponse::ok(product, "Product fetched successfully"))
}

async fn create_product(
    State(state): State<AppState>,
    ctx: StoreContext,
    ApiJson(body): ApiJson<NewProduct>,
) -> ApiResult<impl IntoResponse> {
    ctx.authorize(Operation::CreateProduct)?;

    let product = state.db.products().create(ctx.store_id(), &body).await?;
    Ok(ApiResponse::created(product, "Product created successfully"))
}

async fn update_product(
    State(state): State<AppState>,
    ctx: StoreContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ProductUpdate>,
) -> ApiResult<impl IntoResponse> {
    ctx.authorize(Operation::UpdateProduct)?;

    let product = state.db.products().update(ctx.store_id(), &id, &body).await?;
    Ok(ApiResponse::ok(product, "Product updated successfully"))
}

async fn delete_product(
    State(state): State<AppState>,
    ctx: StoreContext,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    ctx.authorize(Operation::DeleteProduct)?;

    state.db.products().soft_delete(ctx.store_id(), &id).await?;
    Ok(ApiResponse::ok(json!({ "id": id }), "Product deleted successfully"))
}
