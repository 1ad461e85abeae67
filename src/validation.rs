use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Width of the `VARCHAR` text columns.
pub(crate) const MAX_TEXT_LEN: usize = 255;

/// Trimmed `value`, or a 400 naming the field when it is blank.
pub(crate) fn required(label: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{label} cannot be empty!")));
    }
    Ok(trimmed.to_string())
}

/// Like [`required`], for values stored in a text column.
pub(crate) fn text(label: &str, value: &str) -> Result<String, AppError> {
    let trimmed = required(label, value)?;
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::Validation(format!("{label} is too long!")));
    }
    Ok(trimmed)
}

/// Lowercased email, checked for shape.
pub(crate) fn email(value: &str) -> Result<String, AppError> {
    let email = text("Email", value)?.to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::Validation("Email is not in a valid format!".into()));
    }
    Ok(email)
}
