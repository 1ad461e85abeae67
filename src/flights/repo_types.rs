use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Flight record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Flight {
    pub flight_number: String,
    pub start_destination: String,
    pub end_destination: String,
    pub takeoff_time: String,
    pub landing_time: String,
    pub price: f64,
}

impl Flight {
    pub fn schedule(&self) -> FlightSchedule<'_> {
        FlightSchedule {
            start_destination: &self.start_destination,
            end_destination: &self.end_destination,
            takeoff_time: &self.takeoff_time,
            landing_time: &self.landing_time,
        }
    }
}

/// The fields that identify a flight for duplicate detection. Price is not
/// part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightSchedule<'a> {
    pub start_destination: &'a str,
    pub end_destination: &'a str,
    pub takeoff_time: &'a str,
    pub landing_time: &'a str,
}

/// A user booked on a flight.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct Passenger {
    pub booking_id: Uuid,
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}
