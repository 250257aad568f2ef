//! Field checks shared by the write paths. All failures are `InvalidArgument`.

use crate::error::{CoreError, CoreResult};

/// Trims optional text; blank becomes `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn required_text(field: &str, value: &str) -> CoreResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::invalid(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

pub fn positive(field: &str, value: f64) -> CoreResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CoreError::invalid(format!("{field} must be a positive number")));
    }
    Ok(value)
}

pub fn non_negative(field: &str, value: f64) -> CoreResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::invalid(format!("{field} must be a non-negative number")));
    }
    Ok(value)
}
