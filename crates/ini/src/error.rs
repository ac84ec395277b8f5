//! INI source error types

use thiserror::Error;

/// Error raised while reading or querying an [`IniSource`](crate::IniSource).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IniError {
    /// Section does not exist
    #[error("No section: '{section}'")]
    NoSection {
        /// Section name
        section: String,
    },

    /// Option does not exist in the section nor in the default section
    #[error("No option '{option}' in section: '{section}'")]
    NoOption {
        /// Section name
        section: String,
        /// Option name
        option: String,
    },

    /// Section created twice
    #[error("Section '{section}' already exists")]
    SectionExists {
        /// Section name
        section: String,
    },

    /// Section header repeated within one source (strict mode)
    #[error("While reading from '{source_name}' [line {line:2}]: section '{section}' already exists")]
    DuplicateSection {
        /// Section name
        section: String,
        /// Name of the source being read
        source_name: String,
        /// 1-based line number
        line: usize,
    },

    /// Option repeated within one section of one source (strict mode)
    #[error(
        "While reading from '{source_name}' [line {line:2}]: option '{option}' in section '{section}' already exists"
    )]
    DuplicateOption {
        /// Section name
        section: String,
        /// Option name
        option: String,
        /// Name of the source being read
        source_name: String,
        /// 1-based line number
        line: usize,
    },

    /// Key/value line found before any section header
    #[error("File contains no section headers.\nfile: '{source_name}', line: {line}\n'{text}'")]
    MissingSectionHeader {
        /// Name of the source being read
        source_name: String,
        /// 1-based line number
        line: usize,
        /// Offending line
        text: String,
    },

    /// One or more lines could not be parsed
    #[error("Source contains parsing errors: '{source_name}'{}", format_parse_errors(.errors))]
    Parse {
        /// Name of the source being read
        source_name: String,
        /// Line number and text of every malformed line
        errors: Vec<(usize, String)>,
    },

    /// Malformed interpolation syntax
    #[error("{message}")]
    InterpolationSyntax {
        /// Section of the option being interpolated
        section: String,
        /// Option being interpolated
        option: String,
        /// Error message
        message: String,
    },

    /// Interpolation refers to an option that does not exist
    #[error(
        "Bad value substitution: option '{option}' in section '{section}' contains an interpolation key '{reference}' which is not a valid option name. Raw value: '{raw_value}'"
    )]
    InterpolationMissingOption {
        /// Section of the option being interpolated
        section: String,
        /// Option being interpolated
        option: String,
        /// Raw value of the option
        raw_value: String,
        /// The unresolved reference
        reference: String,
    },

    /// Interpolation nested deeper than the allowed maximum
    #[error(
        "Recursion limit exceeded in value substitution: option '{option}' in section '{section}' contains an interpolation key which cannot be substituted in {max_depth} steps. Raw value: '{raw_value}'"
    )]
    InterpolationDepth {
        /// Section of the option being interpolated
        section: String,
        /// Option being interpolated
        option: String,
        /// Raw value of the option
        raw_value: String,
        /// Maximum depth
        max_depth: usize,
    },

    /// Value could not be converted by a typed accessor
    #[error("{message}")]
    InvalidValue {
        /// Section name
        section: String,
        /// Option name
        option: String,
        /// Error message
        message: String,
    },

    /// Delimiter or comment configuration cannot be compiled
    #[error("Invalid INI syntax configuration: {message}")]
    InvalidPattern {
        /// Error message from the pattern compiler
        message: String,
    },

    /// Source file could not be read
    #[error("Failed to read INI file {path}: {message}")]
    Io {
        /// File path
        path: String,
        /// Error message
        message: String,
    },
}

fn format_parse_errors(errors: &[(usize, String)]) -> String {
    errors
        .iter()
        .map(|(line, text)| format!("\n\t[line {line:2}]: '{text}'"))
        .collect()
}

impl IniError {
    /// Create a missing section error
    pub fn no_section(section: impl Into<String>) -> Self {
        Self::NoSection {
            section: section.into(),
        }
    }

    /// Create a missing option error
    pub fn no_option(section: impl Into<String>, option: impl Into<String>) -> Self {
        Self::NoOption {
            section: section.into(),
            option: option.into(),
        }
    }

    /// Create an interpolation syntax error
    pub fn interpolation_syntax(
        section: impl Into<String>,
        option: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InterpolationSyntax {
            section: section.into(),
            option: option.into(),
            message: message.into(),
        }
    }

    /// Create a typed accessor conversion error
    pub fn invalid_value(
        section: impl Into<String>,
        option: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            section: section.into(),
            option: option.into(),
            message: message.into(),
        }
    }

    /// Check whether this error comes from value substitution
    pub fn is_interpolation(&self) -> bool {
        matches!(
            self,
            Self::InterpolationSyntax { .. }
                | Self::InterpolationMissingOption { .. }
                | Self::InterpolationDepth { .. }
        )
    }
}

/// Result type for INI operations
pub type IniResult<T> = Result<T, IniError>;
