//! Store-scoped sales (`store-id` header).
//!
//! `POST /sales` is the hot path: the whole request is one storage
//! transaction inside `SaleRepository::record_sale`.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde_json::json;

use shopfloor_core::authz::Operation;
use shopfloor_core::sale::SaleRequest;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, StoreContext};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales).post(record_sale))
        .route("/sales/{id}", get(get_sale).delete(delete_sale))
}

async fn record_sale(
    State(state): State<AppState>,
    ctx: StoreContext,
    ApiJson(body): ApiJson<SaleRequest>,
) -> ApiResult<impl IntoResponse> {
    ctx.authorize(Operation::RecordSale)?;

    let sale = state
        .db
        .sales()
        .record_sale(&ctx.scope, &ctx.user.id, &body)
        .await?;
    Ok(ApiResponse::created(sale, "Sale recorded successfully"))
}

async fn list_sales(State(state): State<AppState>, ctx: StoreContext) -> ApiResult<impl IntoResponse> {
    ctx.authorize(Operation::ViewSales)?;

    let sales = state.db.sales().list(ctx.store_id()).await?;
    Ok(ApiResponse::ok(sales, "Sales fetched successfully"))
}

async fn get_sale(
    State(state): State<AppState>,
    ctx: StoreContext,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    ctx.authorize(Operation::ViewSales)?;

    let sale = state
        .db
        .sales()
        .get_by_id(ctx.store_id(), &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale"))?;
    Ok(ApiResponse::ok(sale, "Sale fetched successfully"))
}

async fn delete_sale(
    State(state): State<AppState>,
    ctx: StoreContext,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    ctx.authorize(Operation::DeleteSale)?;

    // Hidden from listings only; stock is not restored
    state.db.sales().soft_delete(ctx.store_id(), &id).await?;
    Ok(ApiResponse::ok(json!({ "id": id }), "Sale deleted successfully"))
}
