use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::repository::RepositoryError;
use crate::services::availability::BookingError;
use crate::services::chatbot::ChatError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Route not found")]
    NotFound,

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("{message}")]
    Internal { message: &'static str, detail: String },
}

impl AppError {
    pub fn internal(message: &'static str, detail: impl ToString) -> Self {
        AppError::Internal { message, detail: detail.to_string() }
    }

    /// Storage failures become a 500 with `message`; rejected bookings keep their own status.
    pub fn from_repository(err: RepositoryError, message: &'static str) -> Self {
        match err {
            RepositoryError::Booking(e) => AppError::Booking(e),
            RepositoryError::Database(e) => AppError::internal(message, e),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Booking(BookingError::NotEnoughSeats { .. }) => StatusCode::CONFLICT,
            AppError::Booking(_) => StatusCode::BAD_REQUEST,
            AppError::Chat(ChatError::NotConfigured)
            | AppError::Chat(ChatError::RateLimited)
            | AppError::Chat(ChatError::CircuitOpen) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Chat(ChatError::InvalidApiKey) | AppError::Chat(ChatError::Upstream { .. }) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Internal { message, detail } = &self {
            tracing::error!("{}: {}", message, detail);
        }

        let body = if matches!(self, AppError::NotFound) {
            json!({ "error": self.to_string() })
        } else {
            json!({ "success": false, "error": self.to_string() })
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"reservations\""),
            );
        }
        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

pub type AppResult<T> = Result<T, AppError>;
