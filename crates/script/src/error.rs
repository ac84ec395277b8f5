//! Script checking error types

use thiserror::Error;

/// Error raised when a snippet does not check out.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// The snippet is not syntactically valid
    #[error("{message} (line {line}, column {column})")]
    Syntax {
        /// Error message
        message: String,
        /// 1-based line
        line: usize,
        /// 1-based column
        column: usize,
    },

    /// No function or class definition in a callable snippet
    #[error("Function or class definition not found")]
    DefinitionNotFound,
}

impl ScriptError {
    /// Create a syntax error at a position
    pub fn syntax(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Result type for script checking
pub type ScriptResult<T> = Result<T, ScriptError>;
