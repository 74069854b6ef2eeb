//! # WebPOS API
//!
//! HTTP server for staff login, inventory reads and sale recording.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           API Server                                    │
//! │                                                                         │
//! │  ┌───────────────┐   ┌─────────────────┐   ┌─────────────────────────┐ │
//! │  │ routes        │──►│ Access Gate     │──►│ SessionAuthority        │ │
//! │  │ (axum Router) │   │ (require_auth)  │   │ (argon2 + HS256 JWT)    │ │
//! │  └───────┬───────┘   └─────────────────┘   └───────────┬─────────────┘ │
//! │          │                                             │               │
//! │          ▼                                             ▼               │
//! │  ┌───────────────┐   ┌─────────────────┐   ┌─────────────────────────┐ │
//! │  │ SaleProcessor │──►│ webpos-core     │   │ webpos-db (SQLite)      │ │
//! │  │               │   │ (plan_sale)     │   │ users · products · sales│ │
//! │  └───────┬───────┘   └─────────────────┘   └─────────────────────────┘ │
//! │          └──────────────── commit (one transaction) ──────▲             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config`]. Everything is `WEBPOS_*` environment variables or an
//! optional `webpos.toml`.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::http::Request;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use webpos_db::Database;

use crate::auth::SessionAuthority;
use crate::config::ApiConfig;
use crate::services::SaleProcessor;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: Arc<SessionAuthority>,
    pub sales: Arc<SaleProcessor>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Wires the services around one database handle.
    pub fn new(db: Database, config: ApiConfig) -> anyhow::Result<Self> {
        let sessions = SessionAuthority::new(db.clone(), &config.signing_secret)?;
        let sales = SaleProcessor::new(db.clone(), config.stock_policy, config.totals_policy);

        Ok(AppState {
            db,
            sessions: Arc::new(sessions),
            sales: Arc::new(sales),
            config: Arc::new(config),
        })
    }
}

/// Builds the full application router.
pub fn build_app(state: AppState) -> Router {
    let cors_permissive = state.config.cors_permissive;

    let app = routes::router(state.clone()).with_state(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri(),
                    status = tracing::field::Empty,
                )
            })
            .on_response(
                |res: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                    let status = res.status();
                    span.record("status", tracing::field::display(status));
                    if status.is_server_error() {
                        tracing::error!(%status, ?latency, "response");
                    } else {
                        tracing::info!(%status, ?latency, "response");
                    }
                },
            ),
    );

    if cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}
