//! Error types for filter design operations.

use lib_types::TypeError;
use thiserror::Error;

/// Errors that can occur while designing a filter.
#[derive(Debug, Error)]
pub enum DesignError {
    /// A design input is outside its valid range.
    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    /// Numerical instability detected.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// A degraded design was rejected by a caller asking for strict results.
    #[error("Design does not meet tolerance: {0}")]
    Degraded(String),
}

impl DesignError {
    /// Create an invalid parameter error.
    pub fn invalid(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// True for [`DesignError::InvalidParameter`].
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }
}

impl From<TypeError> for DesignError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::UnknownFilterKind(kind) => {
                Self::invalid("kind", format!("unknown filter kind '{}'", kind))
            }
            TypeError::UnknownBand(band) => {
                Self::invalid("band", format!("unknown band '{}'", band))
            }
            TypeError::InvalidValue { field, message } => Self::invalid(field, message),
        }
    }
}

/// Result type for design operations.
pub type DesignResult<T> = Result<T, DesignError>;
