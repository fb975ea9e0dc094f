use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::http::error::ApiResult;
use crate::services::CartView;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddItemBody {
    pub product_id: Uuid,
    #[serde(default = "one")]
    pub quantity: i64,
}

fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct QuantityBody {
    pub quantity: i64,
}

pub async fn view(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<CartView>> {
    Ok(Json(state.carts.view(user_id).await?))
}

pub async fn clear(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<CartView>> {
    Ok(Json(state.carts.clear(user_id).await?))
}

pub async fn add_item(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<AddItemBody>,
) -> ApiResult<Json<CartView>> {
    let cart = state
        .carts
        .add_item(user_id, body.product_id, body.quantity)
        .await?;
    Ok(Json(cart))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<QuantityBody>,
) -> ApiResult<Json<CartView>> {
    let cart = state
        .carts
        .update_quantity(user_id, product_id, body.quantity)
        .await?;
    Ok(Json(cart))
}

pub async fn remove_item(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<CartView>> {
    Ok(Json(state.carts.remove_item(user_id, product_id).await?))
}
