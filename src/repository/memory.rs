use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use super::{RepositoryError, ReservationRepository};
use crate::models::{MealType, NewReservation, Reservation, ReservationFilter};
use crate::services::availability::{check_remaining, BookedSeats};

/// Process-local store. The write lock covers the whole check-and-insert,
/// so concurrent bookings for one slot are serialized the same way the
/// advisory lock serializes them in Postgres.
#[derive(Default)]
pub struct InMemoryReservationRepository {
    reservations: RwLock<Vec<Reservation>>,
}

impl InMemoryReservationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.reservations.read().await.len()
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn booked_seats(&self, date: NaiveDate, meal: MealType) -> Result<BookedSeats, RepositoryError> {
        let reservations = self.reservations.read().await;
        Ok(reservations
            .iter()
            .filter(|r| r.reservation_date == date && r.meal_type == meal)
            .map(|r| (r.seating_area, r.party_size))
            .collect())
    }

    async fn insert_if_available(&self, reservation: NewReservation) -> Result<Reservation, RepositoryError> {
        let mut reservations = self.reservations.write().await;

        let booked: i32 = reservations
            .iter()
            .filter(|r| {
                r.reservation_date == reservation.reservation_date
                    && r.meal_type == reservation.meal_type
                    && r.seating_area == reservation.seating_area
            })
            .map(|r| r.party_size)
            .sum();
        check_remaining(reservation.seating_area, reservation.party_size, booked)?;

        let id = reservations.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let created = reservation.into_reservation(id, Utc::now());
        reservations.push(created.clone());
        Ok(created)
    }

    async fn list(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, RepositoryError> {
        let reservations = self.reservations.read().await;
        let mut matching: Vec<Reservation> = reservations
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            (a.reservation_date, a.meal_type, a.created_at, a.id)
                .cmp(&(b.reservation_date, b.meal_type, b.created_at, b.id))
        });
        Ok(matching)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
