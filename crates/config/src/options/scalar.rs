//! Options holding a single value of one kind
//!
//! [`ScalarOption`] carries the state every value option shares: name,
//! description, required flag, default and current value. What differs per
//! value type (parsing, checking, formatting and the message field used)
//! lives in an [`OptionKind`].

use std::fmt;

use strata_ini::IniSource;
use strata_message::{ConfigMessage, TaggedValue};
use tracing::trace;

use crate::core::error::{ConfigError, ConfigResult};
use crate::core::option::{AnyValue, ConfigOption, UNDEFINED, ensure_section};

/// Per-type behavior of a [`ScalarOption`]
pub trait OptionKind: fmt::Debug + Send + Sync + 'static {
    /// Native value type
    type Value: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    /// Name of the value type
    fn type_name(&self) -> String;

    /// Description rendered after `; Type: `
    fn value_description(&self) -> String {
        self.type_name()
    }

    /// Reject values the kind does not accept
    fn check(&self, _option: &str, _value: &Self::Value) -> ConfigResult<()> {
        Ok(())
    }

    /// Parse the canonical text form
    fn parse(&self, option: &str, text: &str) -> ConfigResult<Self::Value>;

    /// Canonical text form
    fn to_str(&self, value: &Self::Value) -> String;

    /// Form used in rendered config text
    fn format(&self, value: &Self::Value) -> String {
        self.to_str(value)
    }

    /// Read the value of `option` from `section`
    ///
    /// Kinds with a typed accessor in the host source override this.
    fn read(&self, source: &IniSource, section: &str, option: &str) -> ConfigResult<Self::Value> {
        let text = source.get(section, option)?;
        self.parse(option, &text)
    }

    /// Message field for a value
    fn to_tagged(&self, value: &Self::Value) -> TaggedValue;

    /// Value from a message field
    fn from_tagged(&self, option: &str, value: &TaggedValue) -> ConfigResult<Self::Value>;
}

/// Option with a single value of kind `K`
pub struct ScalarOption<K: OptionKind> {
    name: String,
    description: String,
    required: bool,
    default: Option<K::Value>,
    value: Option<K::Value>,
    kind: K,
}

impl<K: OptionKind + Default> ScalarOption<K> {
    /// Create an option with the default kind settings
    ///
    /// # Panics
    ///
    /// Panics if `name` or `description` is empty.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_kind(name, description, K::default())
    }
}

impl<K: OptionKind> ScalarOption<K> {
    /// Create an option with explicit kind settings
    ///
    /// # Panics
    ///
    /// Panics if `name` or `description` is empty.
    pub fn with_kind(name: impl Into<String>, description: impl Into<String>, kind: K) -> Self {
        let name = name.into();
        let description = description.into();
        assert!(!name.is_empty(), "option name must not be empty");
        assert!(
            !description.is_empty(),
            "option '{name}' must have a description"
        );
        Self {
            name,
            description,
            required: false,
            default: None,
            value: None,
            kind,
        }
    }

    /// Mark the option as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value and install it as the current value
    ///
    /// # Panics
    ///
    /// Panics if the kind rejects `default`.
    #[must_use]
    pub fn with_default(mut self, default: K::Value) -> Self {
        if let Err(err) = self.kind.check(&self.name, &default) {
            panic!("invalid default for option '{}': {err}", self.name);
        }
        self.value = Some(default.clone());
        self.default = Some(default);
        self
    }

    /// Kind settings
    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut K {
        &mut self.kind
    }

    /// Current value
    pub fn value(&self) -> Option<&K::Value> {
        self.value.as_ref()
    }

    /// Default value
    pub fn default_value(&self) -> Option<&K::Value> {
        self.default.as_ref()
    }

    /// Set or remove the value
    ///
    /// Removing the value of a required option is a value error.
    pub fn set_value(&mut self, value: Option<K::Value>) -> ConfigResult<()> {
        match value {
            None if self.required => Err(ConfigError::value_required(&self.name)),
            None => {
                self.value = None;
                Ok(())
            }
            Some(value) => {
                self.kind.check(&self.name, &value)?;
                self.value = Some(value);
                Ok(())
            }
        }
    }
}

impl<K: OptionKind> fmt::Debug for ScalarOption<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarOption")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

impl<K: OptionKind> ConfigOption for ScalarOption<K> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn type_name(&self) -> String {
        self.kind.type_name()
    }

    fn value_description(&self) -> String {
        self.kind.value_description()
    }

    fn has_value(&self) -> bool {
        self.value.is_some()
    }

    fn is_default(&self) -> bool {
        self.value == self.default
    }

    fn clear(&mut self, to_default: bool) {
        self.value = if to_default { self.default.clone() } else { None };
    }

    fn get_as_str(&self) -> String {
        self.value
            .as_ref()
            .map(|value| self.kind.to_str(value))
            .unwrap_or_default()
    }

    fn set_as_str(&mut self, text: &str) -> ConfigResult<()> {
        let value = self.kind.parse(&self.name, text)?;
        self.set_value(Some(value))
    }

    fn get_formatted(&self) -> String {
        match &self.value {
            Some(value) => self.kind.format(value),
            None => UNDEFINED.to_string(),
        }
    }

    fn set_dynamic(&mut self, value: Option<&dyn AnyValue>) -> ConfigResult<()> {
        let Some(value) = value else {
            return self.set_value(None);
        };
        match value.as_any_value().downcast_ref::<K::Value>() {
            Some(typed) => self.set_value(Some(typed.clone())),
            None => Err(ConfigError::wrong_type(
                &self.name,
                &self.kind.type_name(),
                &value.value_type_name(),
            )),
        }
    }

    fn load_config(&mut self, source: &IniSource, section: &str) -> ConfigResult<()> {
        ensure_section(source, section)?;
        if source.has_option(section, &self.name) {
            let value = self.kind.read(source, section, &self.name)?;
            trace!(option = %self.name, section, value = ?value, "option loaded");
            self.set_value(Some(value))?;
        }
        Ok(())
    }

    fn load_proto(&mut self, message: &ConfigMessage) -> ConfigResult<()> {
        if let Some(tagged) = message.option(&self.name) {
            let value = self.kind.from_tagged(&self.name, tagged)?;
            self.set_value(Some(value))?;
        }
        Ok(())
    }

    fn save_proto(&self, message: &mut ConfigMessage) {
        if let Some(value) = &self.value {
            message.set_option(self.name.clone(), self.kind.to_tagged(value));
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
