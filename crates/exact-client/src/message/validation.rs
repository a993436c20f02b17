//! Field constraints checked before a request reaches the wire.

use thiserror::Error;

/// A request payload violated a field constraint.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Required text field was empty or whitespace.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// Device identifier was not hexadecimal.
    #[error("{field} must be a hexadecimal identifier, got '{value}'")]
    NotHexadecimal { field: &'static str, value: String },

    /// Numeric field fell outside its permitted range.
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Numeric field was NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    /// Channel subscription named no channels.
    #[error("at least one channel must be given")]
    NoChannels,

    /// Channel name is not part of the protocol.
    #[error("unknown channel '{0}'")]
    UnknownChannel(String),

    /// User role is not part of the protocol.
    #[error("unknown user role '{0}'")]
    UnknownRole(String),

    /// Configuration item is not queryable.
    #[error("unknown configuration item '{0}'")]
    UnknownConfigItem(String),
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

pub(crate) fn require_hex_id(field: &'static str, value: &str) -> Result<(), ValidationError> {
    require_text(field, value)?;
    if !value.chars().all(|character| character.is_ascii_hexdigit()) {
        return Err(ValidationError::NotHexadecimal {
            field,
            value: value.to_owned(),
        });
    }
    Ok(())
}

pub(crate) fn require_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    Ok(())
}

pub(crate) fn require_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    require_finite(field, value)?;
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
