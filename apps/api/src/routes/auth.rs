use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::ApiJson;
use crate::auth::{AuthUser, LoginOutcome};
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default, alias = "old_password")]
    pub old_password: String,
    #[serde(default, alias = "new_password")]
    pub new_password: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

pub fn gated_router() -> Router<AppState> {
    Router::new().route("/auth/change-password", post(change_password))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginOutcome>, ApiError> {
    let outcome = state.sessions.authenticate(&body.username, &body.password).await?;
    Ok(Json(outcome))
}

async fn change_password(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .sessions
        .change_password(claims.id, &body.old_password, &body.new_password)
        .await?;
    Ok(Json(json!({ "ok": true })))
}
