use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

// GET /
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Honda Shokudo API is running" }))
}

// GET /api/health - проверяем доступность хранилища
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = Utc::now().to_rfc3339();
    match state.reservations.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "OK",
                "timestamp": timestamp,
                "database": "Connected"
            })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "ERROR",
                    "timestamp": timestamp,
                    "database": "Disconnected",
                    "error": e.to_string()
                })),
            )
        }
    }
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}
