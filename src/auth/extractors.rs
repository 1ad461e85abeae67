use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;

use super::{
    claims::Claims,
    jwt::JwtKeys,
    policy::{authenticate, authorize, Rule},
};
use crate::error::AppError;

pub const TOKEN_COOKIE: &str = "token";

/// Reads the auth token from the `token` cookie, falling back to an
/// `Authorization: Bearer` header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Any authenticated caller. Ownership rules are checked by the handler once
/// the target resource is known.
pub struct Caller(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token = token_from_headers(&parts.headers);
        let claims = authenticate(&keys, token.as_deref())?;
        Ok(Caller(claims))
    }
}

/// Caller holding the admin claim.
pub struct Admin(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for Admin
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token = token_from_headers(&parts.headers);
        let claims = authorize(&keys, token.as_deref(), Rule::AdminRequired)?;
        Ok(Admin(claims))
    }
}
