//! Error types for option and section operations

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use strata_convert::ConvertError;
use strata_ini::IniError;
use strata_script::ScriptError;
use thiserror::Error;

/// Shared, cloneable underlying cause of an error
pub type ErrorCause = Arc<dyn StdError + Send + Sync + 'static>;

/// Broad error category, so callers can tell a structural configuration
/// mistake from a single bad value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Value has the wrong type
    Type,
    /// Value has the right type but is not acceptable
    Value,
    /// User code does not parse
    Syntax,
    /// Structural problem: missing required value or section, bad binding
    Config,
    /// Referenced section does not exist in the text source
    Key,
    /// Failure reported by the text source itself
    Source,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Type => "type",
            Self::Value => "value",
            Self::Syntax => "syntax",
            Self::Config => "config",
            Self::Key => "key",
            Self::Source => "source",
        };
        f.write_str(name)
    }
}

/// Error raised by options and configuration sections.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    /// Value is of the wrong type
    #[error("{message}")]
    Type {
        /// Error message
        message: String,
    },

    /// Value is of the right type but semantically invalid
    #[error("{message}")]
    Value {
        /// Error message
        message: String,
        /// Lower level failure that caused this one
        #[source]
        source: Option<ErrorCause>,
    },

    /// User code failed the syntax check
    #[error("Invalid source code: {source}")]
    Syntax {
        /// Checker failure
        #[source]
        source: ScriptError,
    },

    /// Structural configuration error
    #[error("{message}")]
    Config {
        /// Error message
        message: String,
        /// Lower level failure that caused this one
        #[source]
        source: Option<ErrorCause>,
    },

    /// Section does not exist in the text source
    #[error("{message}")]
    Key {
        /// Error message
        message: String,
    },

    /// Text source failure, such as a broken interpolation reference
    #[error(transparent)]
    Source(#[from] IniError),
}

impl ConfigError {
    /// Create a type error
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type {
            message: message.into(),
        }
    }

    /// Create a value error
    pub fn value(message: impl Into<String>) -> Self {
        Self::Value {
            message: message.into(),
            source: None,
        }
    }

    /// Create a value error chained to its cause
    pub fn value_caused_by(
        message: impl Into<String>,
        cause: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Value {
            message: message.into(),
            source: Some(Arc::new(cause)),
        }
    }

    /// Create a structural configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a missing section error
    pub fn key(message: impl Into<String>) -> Self {
        Self::Key {
            message: message.into(),
        }
    }

    /// A required option was assigned no value
    pub fn value_required(option: &str) -> Self {
        Self::value(format!("Value is required for option '{option}'."))
    }

    /// A value of another type was assigned to an option
    pub fn wrong_type(option: &str, expected: &str, actual: &str) -> Self {
        Self::type_error(format!(
            "Option '{option}' value must be a '{expected}', not '{actual}'"
        ))
    }

    /// A message field holds a kind the option cannot read
    pub fn wrong_value_type(kind: impl fmt::Display) -> Self {
        Self::type_error(format!("Wrong value type: {kind}"))
    }

    /// A required option has no value
    pub fn missing_value(option: &str) -> Self {
        Self::config(format!("Missing value for required option '{option}'"))
    }

    /// A section is missing from the text source
    pub fn section_not_found(section: &str) -> Self {
        Self::key(format!(
            "Configuration error: section '{section}' not found!"
        ))
    }

    /// A mandatory configuration section is missing from the text source
    pub fn missing_section(section: &str) -> Self {
        Self::config(format!(
            "Configuration error: section '{section}' not found!"
        ))
    }

    /// Wrap a non-structural failure raised while loading a section
    pub fn loading(cause: Self) -> Self {
        Self::Config {
            message: format!("Configuration error: {cause}"),
            source: Some(Arc::new(cause)),
        }
    }

    /// Map a failed typed read from the text source to a type error
    pub(crate) fn typed_read(err: IniError) -> Self {
        match err {
            IniError::InvalidValue { message, .. } => Self::type_error(message),
            other => Self::Source(other),
        }
    }

    /// Broad category of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Type { .. } => ErrorKind::Type,
            Self::Value { .. } => ErrorKind::Value,
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::Config { .. } => ErrorKind::Config,
            Self::Key { .. } => ErrorKind::Key,
            Self::Source(_) => ErrorKind::Source,
        }
    }

    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Type { .. } => "CONFIG_TYPE",
            Self::Value { .. } => "CONFIG_VALUE",
            Self::Syntax { .. } => "CONFIG_SYNTAX",
            Self::Config { .. } => "CONFIG_STRUCTURE",
            Self::Key { .. } => "CONFIG_KEY",
            Self::Source(_) => "CONFIG_SOURCE",
        }
    }

    /// Whether this is a structural error rather than a bad individual value
    #[must_use]
    pub fn is_structural(&self) -> bool {
        self.kind() == ErrorKind::Config
    }
}

impl From<ScriptError> for ConfigError {
    fn from(source: ScriptError) -> Self {
        match source {
            ScriptError::Syntax { .. } => Self::Syntax { source },
            other => Self::value(other.to_string()),
        }
    }
}

impl From<ConvertError> for ConfigError {
    fn from(err: ConvertError) -> Self {
        Self::value(err.to_string())
    }
}

/// Result type for option and section operations
pub type ConfigResult<T> = Result<T, ConfigError>;
