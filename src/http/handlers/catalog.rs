use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use crate::http::error::ApiResult;
use crate::services::{CatalogPage, CatalogQuery, ProductView};
use crate::state::AppState;

pub async fn list_products(
    State(state): State<AppState>,
    Query(mut query): Query<CatalogQuery>,
) -> ApiResult<Json<CatalogPage>> {
    query.include_unpublished = false;
    Ok(Json(state.catalog.browse(&query).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProductView>> {
    Ok(Json(state.catalog.get(id, false).await?))
}

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.catalog.categories().await?))
}
