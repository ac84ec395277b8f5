//! Capability interface shared by every option kind

use std::any::Any;
use std::fmt;
use std::fmt::Write as _;

use strata_ini::IniSource;
use strata_message::ConfigMessage;

use crate::core::config::Config;
use crate::core::error::{ConfigError, ConfigResult};
use crate::text::prefix_continuation;

/// Sentinel rendered for an option without a value
pub const UNDEFINED: &str = "<UNDEFINED>";

/// A value handed to [`ConfigOption::set_dynamic`].
///
/// Implemented for every `'static` type, so any value can be offered to any
/// option and rejected with a type error naming its type.
pub trait AnyValue: Any + Send + Sync {
    /// The value as [`Any`] for downcasting
    fn as_any_value(&self) -> &dyn Any;

    /// Short type name used in error messages
    fn value_type_name(&self) -> String;
}

impl<T: Any + Send + Sync> AnyValue for T {
    fn as_any_value(&self) -> &dyn Any {
        self
    }

    fn value_type_name(&self) -> String {
        short_type_name(std::any::type_name::<T>())
    }
}

/// Strip module paths from a Rust type name
///
/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`.
pub fn short_type_name(full: &str) -> String {
    let mut result = String::with_capacity(full.len());
    let mut word = String::new();
    let mut chars = full.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch.is_alphanumeric() || ch == '_' {
            word.push(ch);
        } else if ch == ':' && chars.peek() == Some(&':') {
            chars.next();
            word.clear();
        } else {
            result.push_str(&word);
            word.clear();
            result.push(ch);
        }
    }
    result.push_str(&word);
    result
}

/// One named, typed, validated configuration value.
///
/// Every option keeps its own value and knows how to move it between the
/// host text format, the structured message and the rendered config text.
pub trait ConfigOption: Any + Send + Sync + fmt::Debug {
    /// Option name, also the key in the host text format
    fn name(&self) -> &str;

    /// Free text description, may span several lines
    fn description(&self) -> &str;

    /// Whether `validate` requires a value
    fn is_required(&self) -> bool;

    /// Name of the value type
    fn type_name(&self) -> String;

    /// Value description rendered after `; Type: `, may span several lines
    fn value_description(&self) -> String {
        self.type_name()
    }

    /// Whether the option holds a value
    fn has_value(&self) -> bool;

    /// Whether the current value equals the default
    fn is_default(&self) -> bool;

    /// Reset the value to the default, or remove it
    fn clear(&mut self, to_default: bool);

    /// Canonical text form of the value, empty when there is none
    fn get_as_str(&self) -> String;

    /// Parse and store a value from its text form
    fn set_as_str(&mut self, text: &str) -> ConfigResult<()>;

    /// Value formatted for the rendered config text
    fn get_formatted(&self) -> String;

    /// Store a value of any type, rejecting values of the wrong type
    fn set_dynamic(&mut self, value: Option<&dyn AnyValue>) -> ConfigResult<()>;

    /// Load the value from `section` of a host source
    ///
    /// An option missing from the section leaves the value untouched.
    fn load_config(&mut self, source: &IniSource, section: &str) -> ConfigResult<()>;

    /// Load the value from a message; a missing field leaves the value untouched
    fn load_proto(&mut self, message: &ConfigMessage) -> ConfigResult<()>;

    /// Store the value into a message; nothing is written without a value
    fn save_proto(&self, message: &mut ConfigMessage);

    /// Check the option state without changing it
    fn validate(&self) -> ConfigResult<()> {
        if self.is_required() && !self.has_value() {
            return Err(ConfigError::missing_value(self.name()));
        }
        Ok(())
    }

    /// Text lines for a config file
    fn get_config(&self, plain: bool) -> String {
        render_option(self, plain)
    }

    /// Configurations held as the value of this option
    fn configs(&self) -> Vec<&Config> {
        Vec::new()
    }

    /// Mutable access to the configurations held as the value
    fn configs_mut(&mut self) -> Vec<&mut Config> {
        Vec::new()
    }

    /// Upcast for downcasting to the concrete option type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete option type
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Render an option as annotated `name = value` text
///
/// Unless `plain`, the line is preceded by comments for the required flag,
/// the description and the value description. The line and its
/// continuation lines are commented out while the value equals the default.
pub fn render_option<O: ConfigOption + ?Sized>(option: &O, plain: bool) -> String {
    let mut lines = String::new();
    if !plain {
        if option.is_required() {
            lines.push_str("; REQUIRED option.\n");
        }
        for line in option.description().trim().lines() {
            let _ = writeln!(lines, "; {line}");
        }
        for (index, line) in option.value_description().lines().enumerate() {
            let label = if index == 0 { "Type: " } else { "" };
            let _ = writeln!(lines, "; {label}{line}");
        }
    }
    let nodef = if option.is_default() { ";" } else { "" };
    let value = if option.has_value() {
        option.get_formatted()
    } else {
        UNDEFINED.to_string()
    };
    let value = prefix_continuation(&value, nodef);
    let _ = writeln!(lines, "{nodef}{} = {value}", option.name());
    lines
}

/// Fail unless `section` exists in `source` or is its default section
pub(crate) fn ensure_section(source: &IniSource, section: &str) -> ConfigResult<()> {
    if source.has_section(section) || source.is_default_section(section) {
        Ok(())
    } else {
        Err(ConfigError::section_not_found(section))
    }
}
