use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AdminUser;
use crate::models::{MealType, NewReservation, ReservationFilter, SeatingArea};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reservations", get(list_reservations).post(create_reservation))
        .route("/reservations/availability/{date}/{meal_type}", get(check_availability))
        .route("/reservations/party-sizes/{date}/{meal_type}", get(party_sizes))
        .route(
            "/reservations/seating-options/{date}/{meal_type}/{party_size}",
            get(seating_options),
        )
}

/* ---------- helpers ---------- */

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
}

fn parse_meal(raw: &str) -> AppResult<MealType> {
    raw.parse().map_err(AppError::BadRequest)
}

fn parse_party_size(raw: &str) -> AppResult<i32> {
    match raw.parse::<i32>() {
        Ok(size) if size >= 1 => Ok(size),
        _ => Err(AppError::BadRequest(format!("Invalid party size '{raw}'"))),
    }
}

/* ---------- AVAILABILITY ---------- */

// GET /api/reservations/availability/{date}/{mealType}
async fn check_availability(
    State(state): State<Arc<AppState>>,
    Path((date, meal_type)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let date = parse_date(&date)?;
    let meal = parse_meal(&meal_type)?;

    let report = state
        .reservations
        .availability(date, meal)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to check availability"))?;

    Ok(Json(json!({
        "success": true,
        "date": date,
        "mealType": meal,
        "open": report.open,
        "availability": report.availability
    })))
}

// GET /api/reservations/party-sizes/{date}/{mealType}
async fn party_sizes(
    State(state): State<Arc<AppState>>,
    Path((date, meal_type)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let date = parse_date(&date)?;
    let meal = parse_meal(&meal_type)?;

    let sizes = state
        .reservations
        .party_sizes(date, meal)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to get available party sizes"))?;

    Ok(Json(json!({
        "success": true,
        "date": date,
        "mealType": meal,
        "availablePartySizes": sizes.available_party_sizes,
        "totalAvailableSeats": sizes.total_available_seats
    })))
}

// GET /api/reservations/seating-options/{date}/{mealType}/{partySize}
async fn seating_options(
    State(state): State<Arc<AppState>>,
    Path((date, meal_type, party_size)): Path<(String, String, String)>,
) -> AppResult<impl IntoResponse> {
    let date = parse_date(&date)?;
    let meal = parse_meal(&meal_type)?;
    let party_size = parse_party_size(&party_size)?;

    let options = state
        .reservations
        .seating_options(date, meal, party_size)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to get seating options"))?;

    Ok(Json(json!({
        "success": true,
        "date": date,
        "mealType": meal,
        "partySize": party_size,
        "availableSeating": options
    })))
}

/* ---------- RESERVATIONS ---------- */

// POST /api/reservations
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateReservationRequest {
    #[validate(required, length(min = 1))]
    customer_name: Option<String>,
    #[validate(required, length(min = 1))]
    phone_number: Option<String>,
    #[validate(required)]
    seating_area: Option<String>,
    #[validate(required)]
    meal_type: Option<String>,
    #[validate(required)]
    reservation_date: Option<String>,
    #[validate(required)]
    party_size: Option<i32>,
    seat_number: Option<i32>,
}

impl CreateReservationRequest {
    fn into_new_reservation(self) -> AppResult<NewReservation> {
        let missing = || AppError::BadRequest("All fields are required".to_string());

        let customer_name = self.customer_name.map(|s| s.trim().to_string()).unwrap_or_default();
        let phone_number = self.phone_number.map(|s| s.trim().to_string()).unwrap_or_default();
        if customer_name.is_empty() || phone_number.is_empty() {
            return Err(missing());
        }

        let seating_area: SeatingArea = self
            .seating_area
            .ok_or_else(missing)?
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid seating area".to_string()))?;
        let meal_type = parse_meal(&self.meal_type.ok_or_else(missing)?)?;
        let reservation_date = parse_date(&self.reservation_date.ok_or_else(missing)?)?;
        let party_size = self.party_size.ok_or_else(missing)?;

        Ok(NewReservation {
            customer_name,
            phone_number,
            seating_area,
            meal_type,
            reservation_date,
            party_size,
            seat_number: self.seat_number,
        })
    }
}

async fn create_reservation(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateReservationRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) = payload?;
    if req.validate().is_err() {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }
    let reservation = req.into_new_reservation()?;

    let created = state
        .reservations
        .create(reservation)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to create reservation"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Reservation created successfully",
            "reservation": created
        })),
    ))
}

// GET /api/reservations - список для администратора
async fn list_reservations(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    filter: Result<Query<ReservationFilter>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(filter) = filter?;
    let reservations = state
        .reservations
        .list(&filter)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to fetch reservations"))?;

    tracing::debug!("{} listed {} reservations", admin.username, reservations.len());

    Ok(Json(json!({
        "success": true,
        "reservations": reservations
    })))
}
