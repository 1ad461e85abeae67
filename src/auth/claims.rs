use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of JWT: login session or email verification link.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Auth,
    Verification,
}

/// JWT payload carried by the `token` cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,       // user ID
    pub name: String,    // "first last"
    pub email: String,
    pub admin: bool,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub kind: TokenKind,
}

/// JWT payload embedded in the verification link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationClaims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub kind: TokenKind,
}
