//! Common validation rules shared across request payloads.

use validator::ValidationError;

use crate::types::UserId;

pub const PASSWORD_MIN_LENGTH: usize = 6;
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Validates password length.
///
/// Requirements:
/// - 6-128 characters
/// - Not only whitespace
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&len) {
        return Err(ValidationError::new("password_invalid_length"));
    }
    if password.trim().is_empty() {
        return Err(ValidationError::new("password_blank"));
    }
    Ok(())
}

/// Validates that an account id is a well-formed UUID.
pub fn validate_user_id(id: &str) -> Result<(), ValidationError> {
    id.parse::<UserId>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("id_invalid"))
}

/// Validates an international phone number.
///
/// Requirements:
/// - Optional leading `+`
/// - 8-15 digits; spaces, dashes and dots are ignored
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let trimmed = phone.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.'))
    {
        return Err(ValidationError::new("phone_invalid_characters"));
    }
    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    if !(8..=15).contains(&digits) {
        return Err(ValidationError::new("phone_invalid_length"));
    }
    Ok(())
}
