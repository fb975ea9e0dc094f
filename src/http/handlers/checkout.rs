use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{CheckoutQuote, PaymentMethod};
use crate::http::error::ApiResult;
use crate::services::{CheckoutRequest, OrderView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteBody {
    pub payment_method: String,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

pub async fn payment_methods(State(state): State<AppState>) -> Json<Vec<PaymentMethod>> {
    Json(state.checkout.payment_methods())
}

pub async fn quote(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<QuoteBody>,
) -> ApiResult<Json<CheckoutQuote>> {
    let quote = state
        .checkout
        .quote_cart(user_id, &body.payment_method, body.coupon_code.as_deref())
        .await?;
    Ok(Json(quote))
}

pub async fn place_order(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<OrderView>)> {
    let order = state.checkout.place_order(user_id, request).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}
