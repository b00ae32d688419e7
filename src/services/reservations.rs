use chrono::{Datelike, FixedOffset, NaiveDate, Offset, Utc, Weekday};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ReservationConfig;
use crate::models::{MealType, NewReservation, Reservation, ReservationFilter};
use crate::repository::{RepositoryError, ReservationRepository};
use crate::services::availability::{
    available_party_sizes, check_party, closed_availability, compute_availability, seating_options,
    total_available_seats, Availability, BookingError, SeatingOption, SeatingPolicy,
};

#[derive(Debug, Clone)]
pub struct AvailabilityReport {
    pub open: bool,
    pub availability: Availability,
}

#[derive(Debug, Clone)]
pub struct PartySizes {
    pub available_party_sizes: Vec<i32>,
    pub total_available_seats: i32,
}

/// Booking rules on top of a reservation store.
#[derive(Clone)]
pub struct ReservationService {
    repo: Arc<dyn ReservationRepository>,
    policy: SeatingPolicy,
    closed_weekdays: Vec<Weekday>,
    local_offset: FixedOffset,
}

impl ReservationService {
    pub fn new(repo: Arc<dyn ReservationRepository>, config: &ReservationConfig) -> Self {
        let local_offset = FixedOffset::east_opt(config.utc_offset_hours * 3600)
            .unwrap_or_else(|| Utc.fix());
        Self {
            repo,
            policy: SeatingPolicy { enforce_party_bounds: config.enforce_party_bounds },
            closed_weekdays: config.closed_weekdays.clone(),
            local_offset,
        }
    }

    pub fn is_open(&self, date: NaiveDate) -> bool {
        !self.closed_weekdays.contains(&date.weekday())
    }

    /// Current date at the restaurant.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.local_offset).date_naive()
    }

    pub async fn availability(&self, date: NaiveDate, meal: MealType) -> Result<AvailabilityReport, RepositoryError> {
        if !self.is_open(date) {
            return Ok(AvailabilityReport { open: false, availability: closed_availability() });
        }
        let booked = self.repo.booked_seats(date, meal).await?;
        Ok(AvailabilityReport { open: true, availability: compute_availability(&booked) })
    }

    pub async fn party_sizes(&self, date: NaiveDate, meal: MealType) -> Result<PartySizes, RepositoryError> {
        let report = self.availability(date, meal).await?;
        Ok(PartySizes {
            available_party_sizes: available_party_sizes(&report.availability, &self.policy),
            total_available_seats: total_available_seats(&report.availability),
        })
    }

    pub async fn seating_options(
        &self,
        date: NaiveDate,
        meal: MealType,
        party_size: i32,
    ) -> Result<Vec<SeatingOption>, RepositoryError> {
        let report = self.availability(date, meal).await?;
        Ok(seating_options(&report.availability, party_size, &self.policy))
    }

    pub async fn create(&self, reservation: NewReservation) -> Result<Reservation, RepositoryError> {
        self.create_as_of(reservation, self.today()).await
    }

    /// Same as `create` with an explicit notion of "today".
    pub async fn create_as_of(
        &self,
        reservation: NewReservation,
        today: NaiveDate,
    ) -> Result<Reservation, RepositoryError> {
        check_party(
            reservation.seating_area,
            reservation.party_size,
            reservation.seat_number,
            &self.policy,
        )?;
        if reservation.reservation_date < today {
            return Err(BookingError::DateInPast.into());
        }
        if !self.is_open(reservation.reservation_date) {
            return Err(BookingError::Closed(reservation.reservation_date.weekday()).into());
        }

        match self.repo.insert_if_available(reservation).await {
            Ok(created) => {
                info!(
                    "Reservation {} created: {} {} {} party of {}",
                    created.id,
                    created.reservation_date,
                    created.meal_type,
                    created.seating_area,
                    created.party_size
                );
                Ok(created)
            }
            Err(RepositoryError::Booking(e)) => {
                warn!("Reservation rejected: {}", e);
                Err(RepositoryError::Booking(e))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn list(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, RepositoryError> {
        self.repo.list(filter).await
    }

    pub async fn ping(&self) -> Result<(), RepositoryError> {
        self.repo.ping().await
    }
}
