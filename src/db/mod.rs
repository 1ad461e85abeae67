//! Persistence seam: a [`Store`] hands out one [`Session`] per request.
//!
//! A session is a unit of work over a single transaction. Dropping it without
//! calling [`Session::commit`] rolls back and releases the connection, so every
//! exit path of a handler (success, early `?` return, panic) frees it.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    bookings::repo_types::{Booking, BookingSummary, UserBooking},
    flights::repo_types::{Flight, FlightSchedule, Passenger},
    users::repo_types::User,
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(conflict_message(db_err.constraint()).into());
            }
        }
        StoreError::Backend(err.into())
    }
}

pub(crate) fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_email_key") => "Email already registered",
        Some("bookings_user_flight_key") => "User has already booked this flight",
        Some("flights_pkey") => "Flight number already taken",
        _ => "Record already exists",
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn Session>>;
}

#[async_trait]
pub trait Session: Send {
    async fn list_users(&mut self) -> StoreResult<Vec<User>>;
    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>>;
    async fn insert_user(&mut self, user: &User) -> StoreResult<()>;
    async fn update_user(&mut self, user: &User) -> StoreResult<()>;
    /// Returns false when no such user exists.
    async fn set_user_verified(&mut self, id: Uuid) -> StoreResult<bool>;
    async fn delete_user(&mut self, id: Uuid) -> StoreResult<()>;

    async fn list_flights(&mut self) -> StoreResult<Vec<Flight>>;
    async fn find_flight(&mut self, flight_number: &str) -> StoreResult<Option<Flight>>;
    async fn find_flight_by_schedule(
        &mut self,
        schedule: &FlightSchedule<'_>,
    ) -> StoreResult<Option<Flight>>;
    async fn insert_flight(&mut self, flight: &Flight) -> StoreResult<()>;
    async fn update_flight(&mut self, flight: &Flight) -> StoreResult<()>;
    async fn delete_flight(&mut self, flight_number: &str) -> StoreResult<()>;
    async fn list_passengers(&mut self, flight_number: &str) -> StoreResult<Vec<Passenger>>;

    async fn list_bookings(&mut self) -> StoreResult<Vec<BookingSummary>>;
    async fn find_booking(&mut self, booking_id: Uuid) -> StoreResult<Option<Booking>>;
    async fn find_booking_for(
        &mut self,
        user_id: Uuid,
        flight_number: &str,
    ) -> StoreResult<Option<Booking>>;
    async fn insert_booking(&mut self, booking: &Booking) -> StoreResult<()>;
    async fn delete_booking(&mut self, booking_id: Uuid) -> StoreResult<()>;
    async fn list_user_bookings(&mut self, user_id: Uuid) -> StoreResult<Vec<UserBooking>>;

    /// Makes the session's writes durable. The session is closed afterwards.
    async fn commit(&mut self) -> StoreResult<()>;
}
