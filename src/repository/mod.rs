//! Storage for reservations.
//!
//! `PostgresReservationRepository` is the production store; the in-memory
//! one backs local development without `DATABASE_URL` and the router tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{MealType, NewReservation, Reservation, ReservationFilter};
use crate::services::availability::{BookedSeats, BookingError};

pub use memory::InMemoryReservationRepository;
pub use postgres::PostgresReservationRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Booking(#[from] BookingError),
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Booked seats per area for one date and meal service.
    async fn booked_seats(&self, date: NaiveDate, meal: MealType) -> Result<BookedSeats, RepositoryError>;

    /// Re-checks remaining seats for the slot and inserts atomically.
    /// Fails with `RepositoryError::Booking(NotEnoughSeats)` when the slot is full.
    async fn insert_if_available(&self, reservation: NewReservation) -> Result<Reservation, RepositoryError>;

    async fn list(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, RepositoryError>;

    async fn ping(&self) -> Result<(), RepositoryError>;
}
