pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::repository::ReservationRepository;
use crate::services::{chatbot::ChatClient, reservations::ReservationService};

// Shared state для всего приложения
pub struct AppState {
    pub config: config::Config,
    pub reservations: ReservationService,
    pub chat: Option<ChatClient>,
}

impl AppState {
    pub fn new(
        config: config::Config,
        repo: Arc<dyn ReservationRepository>,
    ) -> Result<Arc<Self>, reqwest::Error> {
        let reservations = ReservationService::new(repo, &config.reservations);

        let chat = if config.features.enable_chatbot {
            Some(ChatClient::from_config(&config.openai, &config.circuit_breaker)?)
        } else {
            None
        };

        Ok(Arc::new(Self { config, reservations, chat }))
    }
}

/// Full HTTP surface: `/`, everything under `/api`, JSON 404 for the rest.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(controllers::health::root))
        .nest("/api", controllers::routes())
        .fallback(controllers::health::not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
