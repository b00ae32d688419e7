//! Seat arithmetic for the three seating areas.
//!
//! Everything here is pure: callers fetch the booked seat totals for one
//! (date, meal) from storage and this module turns them into availability,
//! party-size and seating-option answers, or rejects a booking.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::SeatingArea;

/// Largest party the booking form offers.
pub const MAX_PARTY_SIZE: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatingPolicy {
    /// Bar for 1-3 guests, tables for 3-6.
    pub enforce_party_bounds: bool,
}

impl Default for SeatingPolicy {
    fn default() -> Self {
        Self { enforce_party_bounds: true }
    }
}

impl SeatingPolicy {
    pub fn allows(&self, area: SeatingArea, party_size: i32) -> bool {
        if party_size < 1 || party_size > area.capacity() {
            return false;
        }
        if !self.enforce_party_bounds {
            return true;
        }
        let (min, max) = area.party_bounds();
        (min..=max).contains(&party_size)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Party size must be at least 1")]
    InvalidPartySize,

    #[error("Party size exceeds maximum capacity for {}", .0.display_name())]
    ExceedsCapacity(SeatingArea),

    #[error("{} is for parties of {min} to {max} people", .area.display_name())]
    OutsidePartyBounds { area: SeatingArea, min: i32, max: i32 },

    #[error("Seat number {seat} does not exist in {}", .area.display_name())]
    InvalidSeatNumber { area: SeatingArea, seat: i32 },

    #[error("Not enough seats available in {}", .area.display_name())]
    NotEnoughSeats { area: SeatingArea, remaining: i32 },

    #[error("Reservations cannot be made for past dates")]
    DateInPast,

    #[error("The restaurant is closed on {0}")]
    Closed(chrono::Weekday),
}

/// Sum of party sizes per area for one (date, meal).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookedSeats(BTreeMap<SeatingArea, i32>);

impl BookedSeats {
    pub fn get(&self, area: SeatingArea) -> i32 {
        self.0.get(&area).copied().unwrap_or(0)
    }

    pub fn add(&mut self, area: SeatingArea, seats: i32) {
        *self.0.entry(area).or_insert(0) += seats;
    }
}

impl FromIterator<(SeatingArea, i32)> for BookedSeats {
    fn from_iter<I: IntoIterator<Item = (SeatingArea, i32)>>(iter: I) -> Self {
        let mut booked = BookedSeats::default();
        for (area, seats) in iter {
            booked.add(area, seats);
        }
        booked
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaAvailability {
    pub name: &'static str,
    pub max_capacity: i32,
    pub current_bookings: i32,
    pub remaining_seats: i32,
    pub available: bool,
}

pub type Availability = BTreeMap<SeatingArea, AreaAvailability>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatingOption {
    pub value: SeatingArea,
    pub label: String,
    pub remaining_seats: i32,
    pub max_capacity: i32,
}

pub fn remaining_seats(area: SeatingArea, booked: i32) -> i32 {
    (area.capacity() - booked).max(0)
}

pub fn compute_availability(booked: &BookedSeats) -> Availability {
    SeatingArea::ALL
        .iter()
        .map(|&area| {
            let current = booked.get(area);
            let remaining = remaining_seats(area, current);
            (
                area,
                AreaAvailability {
                    name: area.display_name(),
                    max_capacity: area.capacity(),
                    current_bookings: current,
                    remaining_seats: remaining,
                    available: remaining > 0,
                },
            )
        })
        .collect()
}

// Выходной день: все зоны недоступны, но структура ответа та же
pub fn closed_availability() -> Availability {
    SeatingArea::ALL
        .iter()
        .map(|&area| {
            (
                area,
                AreaAvailability {
                    name: area.display_name(),
                    max_capacity: area.capacity(),
                    current_bookings: 0,
                    remaining_seats: 0,
                    available: false,
                },
            )
        })
        .collect()
}

pub fn total_available_seats(availability: &Availability) -> i32 {
    availability
        .values()
        .filter(|a| a.available)
        .map(|a| a.remaining_seats)
        .sum()
}

pub fn seating_options(
    availability: &Availability,
    party_size: i32,
    policy: &SeatingPolicy,
) -> Vec<SeatingOption> {
    availability
        .iter()
        .filter(|(area, data)| {
            data.available && data.remaining_seats >= party_size && policy.allows(**area, party_size)
        })
        .map(|(area, data)| SeatingOption {
            value: *area,
            label: format!("{} ({} seats)", data.name, data.max_capacity),
            remaining_seats: data.remaining_seats,
            max_capacity: data.max_capacity,
        })
        .collect()
}

/// Party sizes for which at least one area still has a place.
pub fn available_party_sizes(availability: &Availability, policy: &SeatingPolicy) -> Vec<i32> {
    (1..=MAX_PARTY_SIZE)
        .filter(|&size| !seating_options(availability, size, policy).is_empty())
        .collect()
}

/// Checks that don't depend on what is already booked.
pub fn check_party(
    area: SeatingArea,
    party_size: i32,
    seat_number: Option<i32>,
    policy: &SeatingPolicy,
) -> Result<(), BookingError> {
    if party_size < 1 {
        return Err(BookingError::InvalidPartySize);
    }
    if party_size > area.capacity() {
        return Err(BookingError::ExceedsCapacity(area));
    }
    if !policy.allows(area, party_size) {
        let (min, max) = area.party_bounds();
        return Err(BookingError::OutsidePartyBounds { area, min, max });
    }
    if let Some(seat) = seat_number {
        if !(1..=area.capacity()).contains(&seat) {
            return Err(BookingError::InvalidSeatNumber { area, seat });
        }
    }
    Ok(())
}

/// Must run under the slot lock: `booked` is the current total for the area.
pub fn check_remaining(area: SeatingArea, party_size: i32, booked: i32) -> Result<(), BookingError> {
    let remaining = remaining_seats(area, booked);
    if remaining < party_size {
        return Err(BookingError::NotEnoughSeats { area, remaining });
    }
    Ok(())
}
