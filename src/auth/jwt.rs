use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::claims::{Claims, TokenKind, VerificationClaims},
    config::JwtConfig,
    state::AppState,
    users::repo_types::User,
};

/// Why a presented token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token could not be decoded")]
    Malformed,
    #[error("token is not valid for this purpose")]
    WrongKind,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        }
    }
}

/// HS256 signing and verification keys with issuer and lifetime.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            ttl: Duration::from_secs(cfg.ttl_minutes * 60),
        }
    }

    fn window(&self) -> (usize, usize) {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        (now.unix_timestamp() as usize, exp.unix_timestamp() as usize)
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub(crate) fn encode<T: Serialize>(&self, claims: &T) -> anyhow::Result<String> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    pub fn sign_auth(&self, user: &User, admin: bool) -> anyhow::Result<String> {
        let (iat, exp) = self.window();
        let claims = Claims {
            sub: user.id,
            name: user.full_name(),
            email: user.email.clone(),
            admin,
            iat,
            exp,
            iss: self.issuer.clone(),
            kind: TokenKind::Auth,
        };
        let token = self.encode(&claims)?;
        debug!(user_id = %user.id, admin, "auth jwt signed");
        Ok(token)
    }

    pub fn sign_verification(&self, user_id: Uuid) -> anyhow::Result<String> {
        let (iat, exp) = self.window();
        let claims = VerificationClaims {
            sub: user_id,
            iat,
            exp,
            iss: self.issuer.clone(),
            kind: TokenKind::Verification,
        };
        let token = self.encode(&claims)?;
        debug!(user_id = %user_id, "verification jwt signed");
        Ok(token)
    }

    fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.leeway = 0;
        Ok(decode::<T>(token, &self.decoding, &validation)?.claims)
    }

    pub fn verify_auth(&self, token: &str) -> Result<Claims, TokenError> {
        let claims: Claims = self.decode(token)?;
        if claims.kind != TokenKind::Auth {
            return Err(TokenError::WrongKind);
        }
        debug!(user_id = %claims.sub, admin = claims.admin, "auth jwt verified");
        Ok(claims)
    }

    pub fn verify_verification(&self, token: &str) -> Result<VerificationClaims, TokenError> {
        let claims: VerificationClaims = self.decode(token)?;
        if claims.kind != TokenKind::Verification {
            return Err(TokenError::WrongKind);
        }
        Ok(claims)
    }
}
