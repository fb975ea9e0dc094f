use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::http::error::ApiResult;
use crate::services::OrderView;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    pub email: String,
}

pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<OrderView>>> {
    Ok(Json(state.orders.list_for_user(user_id).await?))
}

pub async fn cancel(
    State(state): State<AppState>,
    Path((user_id, order_id)): Path<(Uuid, String)>,
) -> ApiResult<Json<OrderView>> {
    Ok(Json(state.orders.cancel(user_id, &order_id).await?))
}

pub async fn track(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Query(query): Query<TrackQuery>,
) -> ApiResult<Json<OrderView>> {
    Ok(Json(state.orders.track(&order_id, &query.email).await?))
}
