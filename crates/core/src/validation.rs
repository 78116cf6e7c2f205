//! Field-level validation shared by the create and update handlers.
//!
//! Each helper returns `CoreError::Validation` naming the offending field.
//! The database carries matching CHECK constraints as a second line.

use chrono::NaiveDate;
use validator::ValidateEmail;

use crate::error::CoreError;
use crate::types::Money;

/// Validate a completion / allocation percentage in `[0, 100]`.
pub fn validate_percentage(value: i32, name: &str) -> Result<(), CoreError> {
    validate_int_range(value, 0, 100, name)
}

/// Validate a risk probability in `[1, 100]`.
pub fn validate_probability(value: i32) -> Result<(), CoreError> {
    validate_int_range(value, 1, 100, "probability")
}

/// Validate a risk impact in `[1, 10]`.
pub fn validate_impact(value: i32) -> Result<(), CoreError> {
    validate_int_range(value, 1, 10, "impact")
}

fn validate_int_range(value: i32, min: i32, max: i32, name: &str) -> Result<(), CoreError> {
    if !(min..=max).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a monetary amount (or hours, or index) is not negative.
pub fn validate_non_negative(value: Money, name: &str) -> Result<(), CoreError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(CoreError::Validation(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a count (team size) is not negative.
pub fn validate_non_negative_count(value: i32, name: &str) -> Result<(), CoreError> {
    if value < 0 {
        return Err(CoreError::Validation(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a required text field is not blank.
pub fn validate_required(value: &str, name: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{name} is required")));
    }
    Ok(())
}

/// Validate that `end` is not before `start` when both are present.
pub fn validate_date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    start_name: &str,
    end_name: &str,
) -> Result<(), CoreError> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(CoreError::Validation(format!(
                "{end_name} ({end}) must not be before {start_name} ({start})"
            )));
        }
    }
    Ok(())
}

/// Validate an email address.
pub fn validate_email(value: &str) -> Result<(), CoreError> {
    if !value.validate_email() {
        return Err(CoreError::Validation(format!(
            "'{value}' is not a valid email address"
        )));
    }
    Ok(())
}
