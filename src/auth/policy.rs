//! Authorization rules evaluated against decoded auth claims.

use uuid::Uuid;

use crate::{
    auth::{claims::Claims, jwt::JwtKeys},
    error::AppError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    AdminRequired,
    /// The caller is the target user, or an admin.
    AdminOrSelf(Uuid),
    /// The caller is the user named in the booking request, or an admin.
    AdminOrBookingSubject(Uuid),
}

impl Rule {
    pub fn allows(&self, claims: &Claims) -> bool {
        if claims.admin {
            return true;
        }
        match self {
            Rule::AdminRequired => false,
            Rule::AdminOrSelf(target) | Rule::AdminOrBookingSubject(target) => {
                claims.sub == *target
            }
        }
    }

    pub fn check(&self, claims: &Claims) -> Result<(), AppError> {
        if self.allows(claims) {
            return Ok(());
        }
        tracing::warn!(user_id = %claims.sub, rule = ?self, "access denied");
        Err(AppError::Forbidden(match self {
            Rule::AdminRequired => "Admin privileges required.".into(),
            Rule::AdminOrSelf(_) => "Admin privileges or account ownership required.".into(),
            Rule::AdminOrBookingSubject(_) => {
                "Only admins may book flights for other users.".into()
            }
        }))
    }
}

/// Full decision for one request: fails closed on a missing or bad token
/// (401, 498 when expired), then applies `rule` (403).
pub fn authorize(keys: &JwtKeys, token: Option<&str>, rule: Rule) -> Result<Claims, AppError> {
    let claims = authenticate(keys, token)?;
    rule.check(&claims)?;
    Ok(claims)
}

/// Token check alone, for routes whose rule needs the loaded resource.
pub fn authenticate(keys: &JwtKeys, token: Option<&str>) -> Result<Claims, AppError> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("No auth token provided.".into()))?;
    Ok(keys.verify_auth(token)?)
}
