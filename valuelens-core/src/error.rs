//! Error types for the valuation engine.
//!
//! The engine performs no I/O, so the only failure is input that cannot
//! describe a real instrument (non-positive prices, out-of-domain readings).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid input: {field} = {value} ({reason})")]
    InvalidInput {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl CoreError {
    pub(crate) fn invalid(field: &'static str, value: f64, reason: &'static str) -> Self {
        CoreError::InvalidInput {
            field,
            value,
            reason,
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            CoreError::InvalidInput { field, .. } => field,
        }
    }
}

/// Require a finite, strictly positive value.
pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<f64, CoreError> {
    if !value.is_finite() {
        return Err(CoreError::invalid(field, value, "must be finite"));
    }
    if value <= 0.0 {
        return Err(CoreError::invalid(field, value, "must be > 0"));
    }
    Ok(value)
}
