use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use webpos_core::{Sale, SaleRequest};

use super::{ApiJson, ApiPath};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SaleCreated {
    pub id: i64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales).post(create_sale))
        .route("/sales/{id}", get(get_sale))
}

async fn create_sale(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(request): ApiJson<SaleRequest>,
) -> Result<Json<SaleCreated>, ApiError> {
    let id = state.sales.process_sale(&request, &claims).await?;
    Ok(Json(SaleCreated { id }))
}

async fn list_sales(State(state): State<AppState>) -> Result<Json<Vec<Sale>>, ApiError> {
    Ok(Json(state.sales.list_sales().await?))
}

async fn get_sale(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Sale>, ApiError> {
    Ok(Json(state.sales.get_sale(id).await?))
}
