use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::ChatMessage;
use crate::services::chatbot::ChatError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/chatbot/chat", post(chat))
}

fn messages_required() -> AppError {
    AppError::BadRequest("Messages array is required".to_string())
}

// POST /api/chatbot/chat
async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(body) = payload.map_err(|_| messages_required())?;

    // messages должен быть массивом {role, content}
    let raw = body
        .get("messages")
        .filter(|m| m.is_array())
        .cloned()
        .ok_or_else(messages_required)?;
    let messages: Vec<ChatMessage> = serde_json::from_value(raw)
        .map_err(|_| AppError::BadRequest("Each message needs a role and content".to_string()))?;

    let client = state.chat.as_ref().ok_or(ChatError::NotConfigured)?;
    let reply = client.reply(messages).await?;

    Ok(Json(json!({
        "success": true,
        "message": reply
    })))
}
