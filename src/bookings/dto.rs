use serde::Deserialize;
use uuid::Uuid;

/// Booking request: `user_id` is the passenger being booked.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub flight_number: String,
}
