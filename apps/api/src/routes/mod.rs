//! HTTP routes.
//!
//! ```text
//! GET  /                       open
//! GET  /health                 open
//! POST /auth/login             open
//! POST /auth/change-password   gated
//! GET  /products               gated
//! GET  /products/{id}          gated
//! POST /sales                  gated
//! GET  /sales                  gated
//! GET  /sales/{id}             gated
//! ```

use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::{middleware, Json, Router};

use crate::auth::require_auth;
use crate::error::ApiError;
use crate::AppState;

pub mod auth;
pub mod health;
pub mod products;
pub mod sales;

/// JSON body whose rejections render as `VALIDATION_ERROR`.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters whose rejections render as `VALIDATION_ERROR`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// All routes, with the gate applied to everything but the open ones.
pub fn router(state: AppState) -> Router<AppState> {
    let gated = Router::new()
        .merge(auth::gated_router())
        .merge(products::router())
        .merge(sales::router())
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(gated)
}
