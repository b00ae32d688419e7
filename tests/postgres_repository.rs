//! Runs against a real Postgres: `DATABASE_URL=... cargo test -- --ignored`.

use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;

use shokudo::database::Database;
use shokudo::models::{MealType, NewReservation, ReservationFilter, SeatingArea};
use shokudo::repository::{PostgresReservationRepository, RepositoryError, ReservationRepository};
use shokudo::services::availability::BookingError;

fn booking(area: SeatingArea, meal: MealType, party_size: i32) -> NewReservation {
    NewReservation {
        customer_name: "Jane Smith".to_string(),
        phone_number: "+0987654321".to_string(),
        seating_area: area,
        meal_type: meal,
        reservation_date: NaiveDate::from_ymd_opt(2030, 5, 8).unwrap(),
        party_size,
        seat_number: Some(1),
    }
}

#[sqlx::test(migrations = "./src/migrations")]
#[ignore = "requires DATABASE_URL pointing at Postgres"]
async fn insert_sum_and_list(pool: PgPool) {
    let repo = PostgresReservationRepository::new(Database { pool });

    let created = repo
        .insert_if_available(booking(SeatingArea::Bar, MealType::Lunch, 2))
        .await
        .unwrap();
    assert!(created.id > 0);
    assert_eq!(created.seat_number, Some(1));
    assert!(created.created_at <= Utc::now() + Duration::seconds(5));

    repo.insert_if_available(booking(SeatingArea::Bar, MealType::Lunch, 3))
        .await
        .unwrap();
    repo.insert_if_available(booking(SeatingArea::Table1, MealType::Dinner, 4))
        .await
        .unwrap();

    let booked = repo
        .booked_seats(created.reservation_date, MealType::Lunch)
        .await
        .unwrap();
    assert_eq!(booked.get(SeatingArea::Bar), 5);
    assert_eq!(booked.get(SeatingArea::Table1), 0);

    let dinner = repo
        .list(&ReservationFilter { date: None, meal_type: Some(MealType::Dinner) })
        .await
        .unwrap();
    assert_eq!(dinner.len(), 1);
    assert_eq!(dinner[0].seating_area, SeatingArea::Table1);

    repo.ping().await.unwrap();
}

#[sqlx::test(migrations = "./src/migrations")]
#[ignore = "requires DATABASE_URL pointing at Postgres"]
async fn full_slot_is_rejected(pool: PgPool) {
    let repo = PostgresReservationRepository::new(Database { pool });

    repo.insert_if_available(booking(SeatingArea::Table2, MealType::Dinner, 6))
        .await
        .unwrap();
    let err = repo
        .insert_if_available(booking(SeatingArea::Table2, MealType::Dinner, 3))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Booking(BookingError::NotEnoughSeats { remaining: 0, .. })
    ));
}

#[sqlx::test(migrations = "./src/migrations")]
#[ignore = "requires DATABASE_URL pointing at Postgres"]
async fn concurrent_inserts_are_serialized(pool: PgPool) {
    let repo = PostgresReservationRepository::new(Database { pool });

    let mut handles = Vec::new();
    for _ in 0..8 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            repo.insert_if_available(booking(SeatingArea::Table1, MealType::Lunch, 4))
                .await
                .is_ok()
        }));
    }
    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);
}
