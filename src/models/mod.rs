pub mod chat;
pub mod reservation;

pub use chat::{ChatMessage, ChatRole};
pub use reservation::{MealType, NewReservation, Reservation, ReservationFilter, SeatingArea};
