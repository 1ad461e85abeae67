use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{dto::MessageResponse, extractors::Admin},
    error::AppError,
    extract::{JsonBody, PathParam},
    state::AppState,
    users::{
        dto::{PublicUser, UpdateUser},
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, admin), fields(admin_id = %admin.sub))]
pub async fn list_users(
    State(state): State<AppState>,
    Admin(admin): Admin,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    let mut session = state.store.begin().await?;
    let users = services::list_users(session.as_mut()).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.sub))]
pub async fn get_user(
    State(state): State<AppState>,
    Admin(admin): Admin,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<PublicUser>, AppError> {
    let mut session = state.store.begin().await?;
    let user = services::get_user(session.as_mut(), id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, admin, body), fields(admin_id = %admin.sub))]
pub async fn update_user(
    State(state): State<AppState>,
    Admin(admin): Admin,
    PathParam(id): PathParam<Uuid>,
    JsonBody(body): JsonBody<UpdateUser>,
) -> Result<Json<PublicUser>, AppError> {
    let mut session = state.store.begin().await?;
    let user = services::update_user(session.as_mut(), id, body).await?;
    session.commit().await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.sub))]
pub async fn delete_user(
    State(state): State<AppState>,
    Admin(admin): Admin,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut session = state.store.begin().await?;
    services::delete_user(session.as_mut(), id).await?;
    session.commit().await?;
    Ok(Json(MessageResponse::new(format!("User with uuid {id} was deleted"))))
}
