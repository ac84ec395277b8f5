//! Message error types

use thiserror::Error;

/// Error raised while encoding or decoding a [`ConfigMessage`](crate::ConfigMessage).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// Serialization to bytes failed
    #[error("Failed to encode configuration message: {message}")]
    Encode {
        /// Error message from the codec
        message: String,
    },

    /// Bytes are not a valid message
    #[error("Failed to decode configuration message: {message}")]
    Decode {
        /// Error message from the codec
        message: String,
    },
}

impl MessageError {
    /// Create an encode error
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Result type for message operations
pub type MessageResult<T> = Result<T, MessageError>;
