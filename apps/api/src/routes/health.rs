//! Open liveness and readiness routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::warn;
use webpos_db::migrations::migration_status;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
}

async fn banner() -> Json<Value> {
    Json(json!({ "ok": true, "name": "WebPOS Backend" }))
}

/// 503 when the store does not answer.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.db.health_check().await {
        let migrations = match migration_status(state.db.pool()).await {
            Ok((total, applied)) => json!({ "applied": applied, "total": total }),
            Err(e) => {
                warn!(error = %e, "Could not read migration status");
                Value::Null
            }
        };
        (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "ok", "migrations": migrations })),
        )
    } else {
        warn!("Health check failed: database unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "database": "unreachable" })),
        )
    }
}
