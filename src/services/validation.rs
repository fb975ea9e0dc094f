//! Precondition checks shared by the services.

use super::error::{Result, ServiceError};

/// Require that a text field has non-whitespace content.
pub fn require_text(value: &str, error_msg: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::invalid(error_msg));
    }
    Ok(())
}

/// Require that a numeric value is positive (> 0).
pub fn require_positive(value: i64, error_msg: &str) -> Result<()> {
    if value <= 0 {
        return Err(ServiceError::invalid(error_msg));
    }
    Ok(())
}

/// Require that a numeric value is non-negative (>= 0).
pub fn require_non_negative(value: i64, error_msg: &str) -> Result<()> {
    if value < 0 {
        return Err(ServiceError::invalid(error_msg));
    }
    Ok(())
}

/// Require that a numeric value does not exceed `max`.
pub fn require_at_most(value: i64, max: i64, error_msg: &str) -> Result<()> {
    if value > max {
        return Err(ServiceError::invalid(error_msg));
    }
    Ok(())
}

/// Require an address of the form `local@domain` with both parts present.
pub fn require_email(value: &str, error_msg: &str) -> Result<()> {
    match value.trim().split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ServiceError::invalid(error_msg)),
    }
}
