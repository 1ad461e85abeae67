use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    bookings::{
        dto::NewBooking,
        repo_types::{Booking, BookingSummary, UserBooking},
    },
    db::Session,
    error::AppError,
    flights::services::require_flight,
    users::services::require_user,
};

fn not_found(booking_id: Uuid) -> AppError {
    AppError::NotFound(format!("Booking with uuid {booking_id} doesn't exist in the DB!"))
}

/// Books `user_id` on `flight_number`: both must exist and the pair must not
/// already be booked.
pub async fn create_booking(session: &mut dyn Session, new: NewBooking) -> Result<Booking, AppError> {
    let flight_number = new.flight_number.trim();
    require_user(session, new.user_id).await?;
    require_flight(session, flight_number).await?;

    if session
        .find_booking_for(new.user_id, flight_number)
        .await?
        .is_some()
    {
        warn!(user_id = %new.user_id, flight_number = %flight_number, "duplicate booking rejected");
        return Err(AppError::Conflict(
            "User has already booked this flight".into(),
        ));
    }

    let booking = Booking {
        booking_id: Uuid::new_v4(),
        user_id: new.user_id,
        flight_number: flight_number.to_string(),
    };
    session.insert_booking(&booking).await?;
    info!(booking_id = %booking.booking_id, user_id = %booking.user_id, flight_number = %booking.flight_number, "booking created");
    Ok(booking)
}

pub async fn list_bookings(session: &mut dyn Session) -> Result<Vec<BookingSummary>, AppError> {
    let bookings = session.list_bookings().await?;
    if bookings.is_empty() {
        return Err(AppError::NotFound("The bookings table is empty".into()));
    }
    Ok(bookings)
}

pub async fn get_booking(session: &mut dyn Session, booking_id: Uuid) -> Result<Booking, AppError> {
    session
        .find_booking(booking_id)
        .await?
        .ok_or_else(|| not_found(booking_id))
}

pub async fn list_user_bookings(
    session: &mut dyn Session,
    user_id: Uuid,
) -> Result<Vec<UserBooking>, AppError> {
    require_user(session, user_id).await?;
    let bookings = session.list_user_bookings(user_id).await?;
    if bookings.is_empty() {
        return Err(AppError::NotFound(format!(
            "User with uuid {user_id} has not booked any flights!"
        )));
    }
    Ok(bookings)
}

pub async fn delete_booking(session: &mut dyn Session, booking_id: Uuid) -> Result<(), AppError> {
    get_booking(session, booking_id).await?;
    session.delete_booking(booking_id).await?;
    info!(booking_id = %booking_id, "booking deleted");
    Ok(())
}
