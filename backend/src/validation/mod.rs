//! Validation of request payloads at the handler boundary.
//!
//! Payload structs derive [`Validate`]; handlers call [`validated`] before
//! passing anything to a service.

pub mod rules;

pub use validator::Validate;

use crate::error::AppError;

/// Runs the payload's validation rules, converting failures into
/// [`AppError::Validation`].
pub fn validated<T: Validate>(payload: T) -> Result<T, AppError> {
    payload.validate()?;
    Ok(payload)
}
