#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use async_trait::async_trait;
use shokudo::{
    config::Config,
    models::{MealType, NewReservation, Reservation, ReservationFilter},
    repository::{InMemoryReservationRepository, RepositoryError, ReservationRepository},
    services::availability::BookedSeats,
    AppState,
};

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.features.enable_chatbot = false;
    config
}

pub fn app_with(config: Config) -> Router {
    let repo = Arc::new(InMemoryReservationRepository::new());
    let state = AppState::new(config, repo).expect("state");
    shokudo::router(state)
}

pub fn app() -> Router {
    app_with(test_config())
}

/// Store whose every call fails the way an unreachable Postgres does.
pub struct UnreachableStore;

#[async_trait]
impl ReservationRepository for UnreachableStore {
    async fn booked_seats(&self, _: NaiveDate, _: MealType) -> Result<BookedSeats, RepositoryError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn insert_if_available(&self, _: NewReservation) -> Result<Reservation, RepositoryError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn list(&self, _: &ReservationFilter) -> Result<Vec<Reservation>, RepositoryError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
}

pub fn app_without_storage() -> Router {
    let state = AppState::new(test_config(), Arc::new(UnreachableStore)).expect("state");
    shokudo::router(state)
}

/// A Wednesday at least two days ahead, so it is open and never "in the past"
/// whatever the restaurant's UTC offset.
pub fn next_open_day() -> NaiveDate {
    let mut day = Utc::now().date_naive() + Duration::days(2);
    while day.weekday() != Weekday::Wed {
        day = day.succ_opt().expect("date");
    }
    day
}

pub fn next_monday() -> NaiveDate {
    let mut day = Utc::now().date_naive() + Duration::days(2);
    while day.weekday() != Weekday::Mon {
        day = day.succ_opt().expect("date");
    }
    day
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

pub fn get_with_basic(uri: &str, user: &str, password: &str) -> Request<Body> {
    let token = general_purpose::STANDARD.encode(format!("{user}:{password}"));
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Basic {token}"))
        .body(Body::empty())
        .expect("request")
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}
