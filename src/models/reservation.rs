use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// One of the three physical sections of the dining room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "seating_area")]
pub enum SeatingArea {
    #[serde(rename = "bar")]
    #[sqlx(rename = "bar")]
    Bar,
    #[serde(rename = "table_1")]
    #[sqlx(rename = "table_1")]
    Table1,
    #[serde(rename = "table_2")]
    #[sqlx(rename = "table_2")]
    Table2,
}

impl SeatingArea {
    pub const ALL: [SeatingArea; 3] = [SeatingArea::Bar, SeatingArea::Table1, SeatingArea::Table2];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeatingArea::Bar => "bar",
            SeatingArea::Table1 => "table_1",
            SeatingArea::Table2 => "table_2",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SeatingArea::Bar => "Bar",
            SeatingArea::Table1 => "Table 1",
            SeatingArea::Table2 => "Table 2",
        }
    }

    /// Fixed number of seats in the area.
    pub fn capacity(&self) -> i32 {
        match self {
            SeatingArea::Bar => 5,
            SeatingArea::Table1 | SeatingArea::Table2 => 6,
        }
    }

    /// Inclusive party-size range the area is meant for.
    pub fn party_bounds(&self) -> (i32, i32) {
        match self {
            SeatingArea::Bar => (1, 3),
            SeatingArea::Table1 | SeatingArea::Table2 => (3, 6),
        }
    }
}

impl fmt::Display for SeatingArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeatingArea {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bar" => Ok(SeatingArea::Bar),
            "table_1" => Ok(SeatingArea::Table1),
            "table_2" => Ok(SeatingArea::Table2),
            other => Err(format!("Invalid seating area: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "meal_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Lunch,
    Dinner,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            other => Err(format!("Invalid meal type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: i64,
    pub customer_name: String,
    pub phone_number: String,
    pub seating_area: SeatingArea,
    pub meal_type: MealType,
    pub reservation_date: NaiveDate,
    pub party_size: i32,
    pub seat_number: Option<i32>,
    pub created_at: DateTime<Utc>,
}

// Бронь, прошедшая валидацию, но ещё не сохранённая
#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub customer_name: String,
    pub phone_number: String,
    pub seating_area: SeatingArea,
    pub meal_type: MealType,
    pub reservation_date: NaiveDate,
    pub party_size: i32,
    pub seat_number: Option<i32>,
}

impl NewReservation {
    pub fn into_reservation(self, id: i64, created_at: DateTime<Utc>) -> Reservation {
        Reservation {
            id,
            customer_name: self.customer_name,
            phone_number: self.phone_number,
            seating_area: self.seating_area,
            meal_type: self.meal_type,
            reservation_date: self.reservation_date,
            party_size: self.party_size,
            seat_number: self.seat_number,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationFilter {
    pub date: Option<NaiveDate>,
    pub meal_type: Option<MealType>,
}

impl ReservationFilter {
    pub fn matches(&self, reservation: &Reservation) -> bool {
        self.date.map_or(true, |d| d == reservation.reservation_date)
            && self.meal_type.map_or(true, |m| m == reservation.meal_type)
    }
}
