pub mod availability;
pub mod chatbot;
pub mod circuit_breaker;
pub mod reservations;
