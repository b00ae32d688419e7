use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info};

use super::{RepositoryError, ReservationRepository};
use crate::database::Database;
use crate::models::{MealType, NewReservation, Reservation, ReservationFilter, SeatingArea};
use crate::services::availability::{check_remaining, BookedSeats};

const RESERVATION_COLUMNS: &str = "id, customer_name, phone_number, seating_area, meal_type, \
     reservation_date, party_size, seat_number, created_at";

#[derive(Clone)]
pub struct PostgresReservationRepository {
    db: Database,
}

impl PostgresReservationRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

// Ключ для advisory lock: один слот = дата + приём пищи + зона
fn slot_key(date: NaiveDate, meal: MealType, area: SeatingArea) -> String {
    format!("reservation:{}:{}:{}", date, meal, area)
}

#[async_trait]
impl ReservationRepository for PostgresReservationRepository {
    async fn booked_seats(&self, date: NaiveDate, meal: MealType) -> Result<BookedSeats, RepositoryError> {
        let rows = sqlx::query_as::<_, (SeatingArea, i64)>(
            r#"
            SELECT seating_area, COALESCE(SUM(party_size), 0)::BIGINT
            FROM reservations
            WHERE reservation_date = $1 AND meal_type = $2
            GROUP BY seating_area
            "#,
        )
        .bind(date)
        .bind(meal)
        .fetch_all(&self.db.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(area, seats)| (area, i32::try_from(seats).unwrap_or(i32::MAX)))
            .collect())
    }

    async fn insert_if_available(&self, reservation: NewReservation) -> Result<Reservation, RepositoryError> {
        let key = slot_key(
            reservation.reservation_date,
            reservation.meal_type,
            reservation.seating_area,
        );

        let mut tx = self.db.pool.begin().await?;

        // Сериализуем конкурентные брони одного слота до конца транзакции
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&key)
            .execute(&mut *tx)
            .await?;

        let booked = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(party_size), 0)::BIGINT
            FROM reservations
            WHERE reservation_date = $1 AND meal_type = $2 AND seating_area = $3
            "#,
        )
        .bind(reservation.reservation_date)
        .bind(reservation.meal_type)
        .bind(reservation.seating_area)
        .fetch_one(&mut *tx)
        .await?;

        let booked = i32::try_from(booked).unwrap_or(i32::MAX);
        if let Err(e) = check_remaining(reservation.seating_area, reservation.party_size, booked) {
            debug!("slot {} is full ({} booked)", key, booked);
            tx.rollback().await?;
            return Err(e.into());
        }

        let insert = format!(
            r#"
            INSERT INTO reservations
                (customer_name, phone_number, seating_area, meal_type, reservation_date, party_size, seat_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {RESERVATION_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, Reservation>(&insert)
            .bind(&reservation.customer_name)
            .bind(&reservation.phone_number)
            .bind(reservation.seating_area)
            .bind(reservation.meal_type)
            .bind(reservation.reservation_date)
            .bind(reservation.party_size)
            .bind(reservation.seat_number)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            "reservation {} stored for {} ({} guests)",
            created.id, key, created.party_size
        );
        Ok(created)
    }

    async fn list(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, RepositoryError> {
        let mut q = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE TRUE");
        let mut bind_idx = 1;
        if filter.date.is_some() {
            q.push_str(&format!(" AND reservation_date = ${}", bind_idx));
            bind_idx += 1;
        }
        if filter.meal_type.is_some() {
            q.push_str(&format!(" AND meal_type = ${}", bind_idx));
        }
        q.push_str(" ORDER BY reservation_date, meal_type, created_at, id");

        let mut dbq = sqlx::query_as::<_, Reservation>(&q);
        if let Some(date) = filter.date {
            dbq = dbq.bind(date);
        }
        if let Some(meal) = filter.meal_type {
            dbq = dbq.bind(meal);
        }

        Ok(dbq.fetch_all(&self.db.pool).await?)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT NOW()").execute(&self.db.pool).await?;
        Ok(())
    }
}
