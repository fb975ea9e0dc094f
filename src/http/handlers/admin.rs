//! Back-office handlers. Every route here sits behind the admin token guard.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{NewProduct, OrderStatus, ProductPatch, User, UserPatch};
use crate::http::error::ApiResult;
use crate::services::{CatalogPage, CatalogQuery, DashboardSummary, OrderFilter, OrderView, ProductView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StockBody {
    pub delta: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserSearch {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct RedeemCodeBody {
    pub code: String,
}

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardSummary>> {
    Ok(Json(state.dashboard.summary().await?))
}

// ============================================================================
// Products
// ============================================================================

pub async fn list_products(
    State(state): State<AppState>,
    Query(mut query): Query<CatalogQuery>,
) -> ApiResult<Json<CatalogPage>> {
    query.include_unpublished = true;
    Ok(Json(state.catalog.browse(&query).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> ApiResult<(StatusCode, Json<ProductView>)> {
    let product = state.catalog.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProductView>> {
    Ok(Json(state.catalog.get(id, true).await?))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProductPatch>,
) -> ApiResult<Json<ProductView>> {
    Ok(Json(state.catalog.update_product(id, patch).await?))
}

pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<StockBody>,
) -> ApiResult<Json<ProductView>> {
    Ok(Json(state.catalog.adjust_stock(id, body.delta).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.catalog.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Users
// ============================================================================

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserSearch>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.users.list(query.search.as_deref()).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<UserPatch>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.update(id, patch).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Orders
// ============================================================================

pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> ApiResult<Json<Vec<OrderView>>> {
    Ok(Json(state.orders.list(&filter).await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<OrderView>> {
    Ok(Json(state.orders.get(&order_id).await?))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<OrderView>> {
    Ok(Json(state.orders.update_status(&order_id, body.status).await?))
}

pub async fn set_redeem_code(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(body): Json<RedeemCodeBody>,
) -> ApiResult<Json<OrderView>> {
    Ok(Json(state.orders.set_redeem_code(&order_id, &body.code).await?))
}
