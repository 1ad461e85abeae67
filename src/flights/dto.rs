use serde::{Deserialize, Serialize};

use crate::flights::repo_types::Passenger;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewFlight {
    pub start_destination: String,
    pub end_destination: String,
    pub takeoff_time: String,
    pub landing_time: String,
    pub price: f64,
}

/// Partial flight update. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateFlight {
    pub start_destination: Option<String>,
    pub end_destination: Option<String>,
    pub takeoff_time: Option<String>,
    pub landing_time: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PassengerList {
    pub flight_number: String,
    pub passengers: Vec<Passenger>,
}
