use axum::{
    extract::State,
    response::Html,
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, LoginForm, MessageResponse, RegisterForm, VerifyQuery},
        extractors::TOKEN_COOKIE,
        services,
    },
    error::AppError,
    extract::{FormBody, QueryParams},
    state::AppState,
    users::dto::PublicUser,
};

const REGISTER_PAGE: &str = r#"<!doctype html>
<html>
<head><title>Register</title></head>
<body>
<form method="post" action="/register">
  <input name="first_name" placeholder="First name">
  <input name="last_name" placeholder="Last name">
  <input name="email" type="email" placeholder="Email">
  <input name="password" type="password" placeholder="Password">
  <button type="submit">Register</button>
</form>
</body>
</html>"#;

const LOGIN_PAGE: &str = r#"<!doctype html>
<html>
<head><title>Login</title></head>
<body>
<form method="post" action="/login">
  <input name="email" type="email" placeholder="Email">
  <input name="password" type="password" placeholder="Password">
  <button type="submit">Login</button>
</form>
</body>
</html>"#;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/verify", get(verify))
}

pub async fn register_page() -> Html<&'static str> {
    Html(REGISTER_PAGE)
}

pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    FormBody(form): FormBody<RegisterForm>,
) -> Result<Json<PublicUser>, AppError> {
    let user = services::register(&state, form).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, jar, form))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    FormBody(form): FormBody<LoginForm>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let (token, user) = services::login(&state, form).await?;

    let cookie = Cookie::build((TOKEN_COOKIE, token.clone()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path("/");

    Ok((
        jar.add(cookie),
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, query))]
pub async fn verify(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<VerifyQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    services::verify(&state, query.token.as_deref()).await?;
    Ok(Json(MessageResponse::new("Your account has been verified")))
}
