use sqlx::PgConnection;
use uuid::Uuid;

use crate::bookings::repo_types::{Booking, BookingSummary, UserBooking};

pub async fn list_summaries(conn: &mut PgConnection) -> Result<Vec<BookingSummary>, sqlx::Error> {
    sqlx::query_as::<_, BookingSummary>(
        r#"
        SELECT b.booking_id, f.flight_number, f.price, u.email, u.first_name, u.last_name
        FROM bookings b
        JOIN users u ON u.id = b.user_id
        JOIN flights f ON f.flight_number = b.flight_number
        ORDER BY f.flight_number, u.last_name
        "#,
    )
    .fetch_all(conn)
    .await
}

pub async fn find_by_id(
    conn: &mut PgConnection,
    booking_id: Uuid,
) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query_as::<_, Booking>(
        r#"
        SELECT booking_id, user_id, flight_number
        FROM bookings
        WHERE booking_id = $1
        "#,
    )
    .bind(booking_id)
    .fetch_optional(conn)
    .await
}

pub async fn find_for_pair(
    conn: &mut PgConnection,
    user_id: Uuid,
    flight_number: &str,
) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query_as::<_, Booking>(
        r#"
        SELECT booking_id, user_id, flight_number
        FROM bookings
        WHERE user_id = $1 AND flight_number = $2
        "#,
    )
    .bind(user_id)
    .bind(flight_number)
    .fetch_optional(conn)
    .await
}

pub async fn insert(conn: &mut PgConnection, booking: &Booking) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO bookings (booking_id, user_id, flight_number)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(booking.booking_id)
    .bind(booking.user_id)
    .bind(&booking.flight_number)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete(conn: &mut PgConnection, booking_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM bookings WHERE booking_id = $1")
        .bind(booking_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn list_for_user(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Vec<UserBooking>, sqlx::Error> {
    sqlx::query_as::<_, UserBooking>(
        r#"
        SELECT b.booking_id, f.flight_number, f.start_destination, f.end_destination,
               f.takeoff_time, f.landing_time, f.price,
               u.email, u.first_name, u.last_name
        FROM bookings b
        JOIN users u ON u.id = b.user_id
        JOIN flights f ON f.flight_number = b.flight_number
        WHERE b.user_id = $1
        ORDER BY f.takeoff_time
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
}
