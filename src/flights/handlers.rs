use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{dto::MessageResponse, extractors::Admin},
    error::AppError,
    extract::{JsonBody, PathParam},
    flights::{
        dto::{NewFlight, PassengerList, UpdateFlight},
        repo_types::Flight,
        services,
    },
    state::AppState,
};

pub fn flight_routes() -> Router<AppState> {
    Router::new()
        .route("/flights", get(list_flights).post(create_flight))
        .route(
            "/flights/:flight_number",
            get(get_flight).put(update_flight).delete(delete_flight),
        )
        .route("/flights/:flight_number/passengers", get(list_passengers))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.sub))]
pub async fn list_flights(
    State(state): State<AppState>,
    Admin(admin): Admin,
) -> Result<Json<Vec<Flight>>, AppError> {
    let mut session = state.store.begin().await?;
    Ok(Json(services::list_flights(session.as_mut()).await?))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.sub))]
pub async fn get_flight(
    State(state): State<AppState>,
    Admin(admin): Admin,
    PathParam(flight_number): PathParam<String>,
) -> Result<Json<Flight>, AppError> {
    let mut session = state.store.begin().await?;
    Ok(Json(services::get_flight(session.as_mut(), &flight_number).await?))
}

#[instrument(skip(state, admin, body), fields(admin_id = %admin.sub))]
pub async fn create_flight(
    State(state): State<AppState>,
    Admin(admin): Admin,
    JsonBody(body): JsonBody<NewFlight>,
) -> Result<Json<Flight>, AppError> {
    let mut session = state.store.begin().await?;
    let flight = services::create_flight(session.as_mut(), body).await?;
    session.commit().await?;
    Ok(Json(flight))
}

#[instrument(skip(state, admin, body), fields(admin_id = %admin.sub))]
pub async fn update_flight(
    State(state): State<AppState>,
    Admin(admin): Admin,
    PathParam(flight_number): PathParam<String>,
    JsonBody(body): JsonBody<UpdateFlight>,
) -> Result<Json<Flight>, AppError> {
    let mut session = state.store.begin().await?;
    let flight = services::update_flight(session.as_mut(), &flight_number, body).await?;
    session.commit().await?;
    Ok(Json(flight))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.sub))]
pub async fn delete_flight(
    State(state): State<AppState>,
    Admin(admin): Admin,
    PathParam(flight_number): PathParam<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut session = state.store.begin().await?;
    services::delete_flight(session.as_mut(), &flight_number).await?;
    session.commit().await?;
    Ok(Json(MessageResponse::new(format!(
        "Flight with number: {flight_number} was removed successfully from the DB"
    ))))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.sub))]
pub async fn list_passengers(
    State(state): State<AppState>,
    Admin(admin): Admin,
    PathParam(flight_number): PathParam<String>,
) -> Result<Json<PassengerList>, AppError> {
    let mut session = state.store.begin().await?;
    let passengers = services::list_passengers(session.as_mut(), &flight_number).await?;
    Ok(Json(PassengerList {
        flight_number,
        passengers,
    }))
}
