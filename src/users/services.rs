use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::password::hash_password,
    db::Session,
    error::AppError,
    users::{dto::UpdateUser, repo_types::User},
    validation,
};

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("User with uuid {id} doesn't exist in the DB!"))
}

pub(crate) async fn require_user(session: &mut dyn Session, id: Uuid) -> Result<User, AppError> {
    session.find_user(id).await?.ok_or_else(|| not_found(id))
}

pub async fn list_users(session: &mut dyn Session) -> Result<Vec<User>, AppError> {
    let users = session.list_users().await?;
    if users.is_empty() {
        return Err(AppError::NotFound("The users table is empty".into()));
    }
    Ok(users)
}

pub async fn get_user(session: &mut dyn Session, id: Uuid) -> Result<User, AppError> {
    require_user(session, id).await
}

/// Applies the present fields. A new password is stored hashed.
pub async fn update_user(
    session: &mut dyn Session,
    id: Uuid,
    changes: UpdateUser,
) -> Result<User, AppError> {
    let mut user = require_user(session, id).await?;

    if let Some(first_name) = changes.first_name {
        user.first_name = validation::text("First name", &first_name)?;
    }
    if let Some(last_name) = changes.last_name {
        user.last_name = validation::text("Last name", &last_name)?;
    }
    if let Some(email) = changes.email {
        let email = validation::email(&email)?;
        if let Some(other) = session.find_user_by_email(&email).await? {
            if other.id != id {
                warn!(user_id = %id, email = %email, "email taken by another user");
                return Err(AppError::Conflict("Email already registered".into()));
            }
        }
        user.email = email;
    }
    if let Some(password) = changes.password {
        validation::required("Password", &password)?;
        user.password = hash_password(&password)?;
    }

    session.update_user(&user).await?;
    info!(user_id = %id, "user updated");
    Ok(user)
}

pub async fn delete_user(session: &mut dyn Session, id: Uuid) -> Result<(), AppError> {
    require_user(session, id).await?;
    session.delete_user(id).await?;
    info!(user_id = %id, "user deleted");
    Ok(())
}
