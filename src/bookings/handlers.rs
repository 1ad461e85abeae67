use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{
        dto::MessageResponse,
        extractors::{Admin, Caller},
        policy::Rule,
    },
    bookings::{
        dto::NewBooking,
        repo_types::{Booking, BookingSummary, UserBooking},
        services,
    },
    error::AppError,
    extract::{JsonBody, PathParam},
    state::AppState,
};

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/:id", get(get_booking).delete(delete_booking))
        .route("/users/:id/bookings", get(list_user_bookings))
}

/// Non-admins may only book themselves.
#[instrument(skip(state, caller, body))]
pub async fn create_booking(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(body): JsonBody<NewBooking>,
) -> Result<Json<Booking>, AppError> {
    Rule::AdminOrBookingSubject(body.user_id).check(&caller)?;

    let mut session = state.store.begin().await?;
    let booking = services::create_booking(session.as_mut(), body).await?;
    session.commit().await?;
    Ok(Json(booking))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.sub))]
pub async fn list_bookings(
    State(state): State<AppState>,
    Admin(admin): Admin,
) -> Result<Json<Vec<BookingSummary>>, AppError> {
    let mut session = state.store.begin().await?;
    Ok(Json(services::list_bookings(session.as_mut()).await?))
}

/// Visible to admins and to the booked user.
#[instrument(skip(state, caller))]
pub async fn get_booking(
    State(state): State<AppState>,
    Caller(caller): Caller,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let mut session = state.store.begin().await?;
    let booking = services::get_booking(session.as_mut(), id).await?;
    Rule::AdminOrSelf(booking.user_id).check(&caller)?;
    Ok(Json(booking))
}

#[instrument(skip(state, caller))]
pub async fn list_user_bookings(
    State(state): State<AppState>,
    Caller(caller): Caller,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Vec<UserBooking>>, AppError> {
    Rule::AdminOrSelf(id).check(&caller)?;

    let mut session = state.store.begin().await?;
    Ok(Json(services::list_user_bookings(session.as_mut(), id).await?))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.sub))]
pub async fn delete_booking(
    State(state): State<AppState>,
    Admin(admin): Admin,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut session = state.store.begin().await?;
    services::delete_booking(session.as_mut(), id).await?;
    session.commit().await?;
    Ok(Json(MessageResponse::new(format!(
        "Booking with uuid {id} was removed successfully from the DB"
    ))))
}
