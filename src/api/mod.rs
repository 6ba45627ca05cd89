//! HTTP surface - a single action-dispatch endpoint.
//!
//! `POST /exec` takes `{"action": <name>, "data": <payload>}` and always answers
//! with the [`ApiResponse`] envelope. Failures keep the envelope and also set an
//! HTTP status matching the error kind.

pub mod actions;
pub mod response;

use crate::{
    config::settings::Settings,
    documents::PdfRenderer,
    errors::{Error, Result},
};
use actions::Action;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use response::{ApiResponse, status_for};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
    /// Document service used by `createPoPdf`; absent when not configured
    pub pdf: Option<Arc<dyn PdfRenderer>>,
}

/// Builds the router with all routes
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/exec", post(exec))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

// The body is parsed by hand so callers posting `text/plain` are accepted too.
async fn exec(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    let action: Action = match serde_json::from_slice(&body) {
        Ok(action) => action,
        Err(e) => {
            warn!("Rejected action request: {e}");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<Value>::error(format!("Invalid action request: {e}"))),
            );
        }
    };

    match actions::dispatch(&state, action).await {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                error!("Action failed: {e}");
            } else {
                warn!("Action refused: {e}");
            }
            (status, Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// Binds the configured address and serves until the process is stopped.
pub async fn serve(settings: &Settings, state: Arc<AppState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(settings.bind_address).await?;
    info!("Listening on http://{}", settings.bind_address);

    axum::serve(listener, router(state))
        .await
        .map_err(Error::Io)
}
