use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use time::{macros::format_description, PrimitiveDateTime};
use tracing::{info, warn};

use crate::{
    db::Session,
    error::AppError,
    flights::{
        dto::{NewFlight, UpdateFlight},
        repo_types::{Flight, Passenger},
    },
    validation,
};

const FLIGHT_NUMBER_ATTEMPTS: usize = 5;

fn not_found(flight_number: &str) -> AppError {
    AppError::NotFound(format!(
        "Flight with number {flight_number} doesn't exist in the DB!"
    ))
}

/// Exactly `YYYY-MM-DD HH:MM`, then checked to be a real date-time.
fn parse_time(label: &str, value: &str) -> Result<PrimitiveDateTime, AppError> {
    lazy_static! {
        static ref TIME_RE: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}$").unwrap();
    }
    let invalid = || {
        AppError::Validation(format!(
            "{label} must be a valid date-time in YYYY-MM-DD HH:MM format!"
        ))
    };
    if !TIME_RE.is_match(value) {
        return Err(invalid());
    }
    PrimitiveDateTime::parse(value, format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .map_err(|_| invalid())
}

/// Validates a complete flight record, trimming its text fields.
pub fn validate_flight(mut flight: Flight) -> Result<Flight, AppError> {
    flight.start_destination = validation::text("Start destination", &flight.start_destination)?;
    flight.end_destination = validation::text("End destination", &flight.end_destination)?;
    flight.takeoff_time = validation::required("Takeoff time", &flight.takeoff_time)?;
    flight.landing_time = validation::required("Landing time", &flight.landing_time)?;

    let takeoff = parse_time("Takeoff time", &flight.takeoff_time)?;
    let landing = parse_time("Landing time", &flight.landing_time)?;
    if landing <= takeoff {
        return Err(AppError::Validation(
            "Landing time must be after takeoff time!".into(),
        ));
    }
    if !flight.price.is_finite() || flight.price < 0.0 {
        return Err(AppError::Validation(
            "Price must be a non-negative number!".into(),
        ));
    }
    Ok(flight)
}

/// Six uppercase hex digits.
pub fn generate_flight_number() -> String {
    format!("{:06X}", rand::thread_rng().gen_range(0..0x100_0000u32))
}

pub(crate) async fn require_flight(
    session: &mut dyn Session,
    flight_number: &str,
) -> Result<Flight, AppError> {
    session
        .find_flight(flight_number)
        .await?
        .ok_or_else(|| not_found(flight_number))
}

pub async fn list_flights(session: &mut dyn Session) -> Result<Vec<Flight>, AppError> {
    let flights = session.list_flights().await?;
    if flights.is_empty() {
        return Err(AppError::NotFound("The flights table is empty".into()));
    }
    Ok(flights)
}

pub async fn get_flight(session: &mut dyn Session, flight_number: &str) -> Result<Flight, AppError> {
    require_flight(session, flight_number).await
}

/// Rejects a flight whose route and times match an existing one, then stores
/// it under a freshly generated flight number.
pub async fn create_flight(session: &mut dyn Session, new: NewFlight) -> Result<Flight, AppError> {
    let mut flight = validate_flight(Flight {
        flight_number: String::new(),
        start_destination: new.start_destination,
        end_destination: new.end_destination,
        takeoff_time: new.takeoff_time,
        landing_time: new.landing_time,
        price: new.price,
    })?;

    if let Some(existing) = session.find_flight_by_schedule(&flight.schedule()).await? {
        warn!(flight_number = %existing.flight_number, "duplicate flight rejected");
        return Err(AppError::Conflict(
            "Cannot add the certain flight! A flight with the same data already exist in the database!"
                .into(),
        ));
    }

    flight.flight_number = unused_flight_number(session).await?;
    session.insert_flight(&flight).await?;
    info!(flight_number = %flight.flight_number, "flight created");
    Ok(flight)
}

async fn unused_flight_number(session: &mut dyn Session) -> Result<String, AppError> {
    for _ in 0..FLIGHT_NUMBER_ATTEMPTS {
        let candidate = generate_flight_number();
        if session.find_flight(&candidate).await?.is_none() {
            return Ok(candidate);
        }
        warn!(flight_number = %candidate, "generated flight number collided");
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "no unused flight number after {FLIGHT_NUMBER_ATTEMPTS} attempts"
    )))
}

pub async fn update_flight(
    session: &mut dyn Session,
    flight_number: &str,
    changes: UpdateFlight,
) -> Result<Flight, AppError> {
    let mut flight = require_flight(session, flight_number).await?;

    if let Some(v) = changes.start_destination {
        flight.start_destination = v;
    }
    if let Some(v) = changes.end_destination {
        flight.end_destination = v;
    }
    if let Some(v) = changes.takeoff_time {
        flight.takeoff_time = v;
    }
    if let Some(v) = changes.landing_time {
        flight.landing_time = v;
    }
    if let Some(v) = changes.price {
        flight.price = v;
    }

    let flight = validate_flight(flight)?;
    session.update_flight(&flight).await?;
    info!(flight_number = %flight_number, "flight updated");
    Ok(flight)
}

pub async fn delete_flight(session: &mut dyn Session, flight_number: &str) -> Result<(), AppError> {
    require_flight(session, flight_number).await?;
    session.delete_flight(flight_number).await?;
    info!(flight_number = %flight_number, "flight deleted");
    Ok(())
}

pub async fn list_passengers(
    session: &mut dyn Session,
    flight_number: &str,
) -> Result<Vec<Passenger>, AppError> {
    require_flight(session, flight_number).await?;
    let passengers = session.list_passengers(flight_number).await?;
    if passengers.is_empty() {
        return Err(AppError::NotFound(format!(
            "Flight with number {flight_number} is empty!"
        )));
    }
    Ok(passengers)
}
