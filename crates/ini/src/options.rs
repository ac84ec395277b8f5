//! Parser settings

use crate::error::{IniError, IniResult};
use regex::Regex;

/// Name of the section whose values act as fallbacks for every other section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Syntax settings for reading INI text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniOptions {
    /// Name of the fallback section
    pub default_section: String,
    /// Characters separating keys from values
    pub delimiters: Vec<String>,
    /// Prefixes marking a whole line as a comment
    pub comment_prefixes: Vec<String>,
    /// Prefixes starting a comment after a value (must follow whitespace)
    pub inline_comment_prefixes: Vec<String>,
    /// Reject duplicate sections and options within one source
    pub strict: bool,
    /// Keep empty lines inside multi-line values
    pub empty_lines_in_values: bool,
}

impl Default for IniOptions {
    fn default() -> Self {
        Self {
            default_section: DEFAULT_SECTION.to_string(),
            delimiters: vec!["=".to_string(), ":".to_string()],
            comment_prefixes: vec!["#".to_string(), ";".to_string()],
            inline_comment_prefixes: Vec::new(),
            strict: true,
            empty_lines_in_values: true,
        }
    }
}

impl IniOptions {
    /// Set the fallback section name
    pub fn with_default_section(mut self, name: impl Into<String>) -> Self {
        self.default_section = name.into();
        self
    }

    /// Set the key/value delimiters
    pub fn with_delimiters<I, S>(mut self, delimiters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.delimiters = delimiters.into_iter().map(Into::into).collect();
        self
    }

    /// Set the full-line comment prefixes
    pub fn with_comment_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comment_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the inline comment prefixes
    pub fn with_inline_comment_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inline_comment_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable strict duplicate checks
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Keep or drop empty lines inside multi-line values
    pub fn with_empty_lines_in_values(mut self, keep: bool) -> Self {
        self.empty_lines_in_values = keep;
        self
    }

    /// Compile the `key <delimiter> value` pattern
    pub(crate) fn option_pattern(&self) -> IniResult<Regex> {
        if self.delimiters.is_empty() {
            return Err(IniError::InvalidPattern {
                message: "at least one delimiter is required".to_string(),
            });
        }
        let delimiters = self
            .delimiters
            .iter()
            .map(|delimiter| regex::escape(delimiter))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(
            r"^(?P<option>.*?)\s*(?P<vi>{delimiters})\s*(?P<value>.*)$"
        ))
        .map_err(|err| IniError::InvalidPattern {
            message: err.to_string(),
        })
    }
}
