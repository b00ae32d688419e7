pub mod chatbot;
pub mod health;
pub mod reservations;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(health::routes())
        .merge(reservations::routes())
        .merge(chatbot::routes())
}
