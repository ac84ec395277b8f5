//! Conversion error types

use thiserror::Error;

/// Error raised while converting values to or from their string form.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// Text could not be parsed into the requested type
    #[error("{message}")]
    InvalidValue {
        /// Name of the target type
        type_name: String,
        /// Error message describing the failure
        message: String,
    },

    /// No convertor registered for the type
    #[error("No string convertor registered for type '{type_name}'")]
    Unregistered {
        /// Name (simple or qualified) that was looked up
        type_name: String,
    },

    /// A value of another type was handed to a convertor
    #[error("Convertor for '{expected}' cannot handle a '{actual}' value")]
    TypeMismatch {
        /// Type the convertor handles
        expected: String,
        /// Type that was passed in
        actual: String,
    },

    /// A named field required to build a value is missing
    #[error("Missing value for field '{field}'")]
    MissingField {
        /// Field name
        field: String,
    },
}

impl ConvertError {
    /// Create an invalid value error
    pub fn invalid_value(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Create an unregistered type error
    pub fn unregistered(type_name: impl Into<String>) -> Self {
        Self::Unregistered {
            type_name: type_name.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

/// Result type for conversion operations
pub type ConvertResult<T> = Result<T, ConvertError>;
