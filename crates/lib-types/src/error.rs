//! Errors raised while constructing core types.

use thiserror::Error;

/// Errors from parsing or validating core design types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    /// Filter kind name is not recognized.
    #[error("Unknown filter kind '{0}' (expected 'lowpass' or 'highpass')")]
    UnknownFilterKind(String),

    /// Band name is not recognized.
    #[error("Unknown band '{0}' (expected 'pass' or 'stop')")]
    UnknownBand(String),

    /// A design parameter is outside its valid range.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

impl TypeError {
    /// Create an invalid value error.
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}
