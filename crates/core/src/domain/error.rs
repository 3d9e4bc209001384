// Domain Validation Errors

use thiserror::Error;

/// Pre-storage invariant violations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{entity}.{field} must not be empty")]
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("{field} out of range: {value} (expected {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Unknown core name: {0}")]
    UnknownCoreName(String),

    #[error("Unknown trend: {0} (expected rising, stable or declining)")]
    UnknownTrend(String),

    #[error("Unknown combination type: {0}")]
    UnknownCombinationType(String),

    #[error("Unknown pattern type: {0}")]
    UnknownPatternType(String),

    #[error("Invalid item in {field}: {item:?}")]
    InvalidListItem { field: &'static str, item: String },
}

pub type Result<T> = std::result::Result<T, ValidationError>;

pub(crate) fn require_non_empty(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(())
}

pub(crate) fn require_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    // NaN fails both comparisons, so it is rejected here too
    if !(value >= min && value <= max) {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
