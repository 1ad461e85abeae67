use sqlx::PgConnection;

use crate::flights::repo_types::{Flight, FlightSchedule, Passenger};

pub async fn list(conn: &mut PgConnection) -> Result<Vec<Flight>, sqlx::Error> {
    sqlx::query_as::<_, Flight>(
        r#"
        SELECT flight_number, start_destination, end_destination,
               takeoff_time, landing_time, price
        FROM flights
        ORDER BY takeoff_time, flight_number
        "#,
    )
    .fetch_all(conn)
    .await
}

pub async fn find_by_number(
    conn: &mut PgConnection,
    flight_number: &str,
) -> Result<Option<Flight>, sqlx::Error> {
    sqlx::query_as::<_, Flight>(
        r#"
        SELECT flight_number, start_destination, end_destination,
               takeoff_time, landing_time, price
        FROM flights
        WHERE flight_number = $1
        "#,
    )
    .bind(flight_number)
    .fetch_optional(conn)
    .await
}

/// Exact match on destinations and times.
pub async fn find_by_schedule(
    conn: &mut PgConnection,
    schedule: &FlightSchedule<'_>,
) -> Result<Option<Flight>, sqlx::Error> {
    sqlx::query_as::<_, Flight>(
        r#"
        SELECT flight_number, start_destination, end_destination,
               takeoff_time, landing_time, price
        FROM flights
        WHERE start_destination = $1
          AND end_destination = $2
          AND takeoff_time = $3
          AND landing_time = $4
        LIMIT 1
        "#,
    )
    .bind(schedule.start_destination)
    .bind(schedule.end_destination)
    .bind(schedule.takeoff_time)
    .bind(schedule.landing_time)
    .fetch_optional(conn)
    .await
}

pub async fn insert(conn: &mut PgConnection, flight: &Flight) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO flights (flight_number, start_destination, end_destination,
                             takeoff_time, landing_time, price)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(&flight.flight_number)
    .bind(&flight.start_destination)
    .bind(&flight.end_destination)
    .bind(&flight.takeoff_time)
    .bind(&flight.landing_time)
    .bind(flight.price)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn update(conn: &mut PgConnection, flight: &Flight) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE flights
        SET start_destination = $2, end_destination = $3,
            takeoff_time = $4, landing_time = $5, price = $6
        WHERE flight_number = $1
        "#,
    )
    .bind(&flight.flight_number)
    .bind(&flight.start_destination)
    .bind(&flight.end_destination)
    .bind(&flight.takeoff_time)
    .bind(&flight.landing_time)
    .bind(flight.price)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete(conn: &mut PgConnection, flight_number: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM flights WHERE flight_number = $1")
        .bind(flight_number)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn list_passengers(
    conn: &mut PgConnection,
    flight_number: &str,
) -> Result<Vec<Passenger>, sqlx::Error> {
    sqlx::query_as::<_, Passenger>(
        r#"
        SELECT b.booking_id, u.id, u.email, u.first_name, u.last_name
        FROM bookings b
        JOIN users u ON u.id = b.user_id
        WHERE b.flight_number = $1
        ORDER BY u.last_name, u.first_name
        "#,
    )
    .bind(flight_number)
    .fetch_all(conn)
    .await
}
