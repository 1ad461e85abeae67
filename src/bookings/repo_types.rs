use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Booking record in the database. Immutable once created.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct Booking {
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub flight_number: String,
}

/// Row of the admin bookings listing.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct BookingSummary {
    pub booking_id: Uuid,
    pub flight_number: String,
    pub price: f64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// A booking joined with its flight, as shown to the booking's user.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct UserBooking {
    pub booking_id: Uuid,
    pub flight_number: String,
    pub start_destination: String,
    pub end_destination: String,
    pub takeoff_time: String,
    pub landing_time: String,
    pub price: f64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}
