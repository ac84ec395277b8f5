//! Kinds for strings, numbers, booleans, UUIDs and text-convertible types

use std::marker::PhantomData;
use std::path::PathBuf;

use rust_decimal::Decimal;
use strata_convert::{Convertible, parse_bool};
use strata_ini::IniSource;
use strata_message::TaggedValue;
use uuid::Uuid;

use crate::core::error::{ConfigError, ConfigResult};
use crate::options::scalar::{OptionKind, ScalarOption};
use crate::text::{has_leading_spaces, prefix_continuation, unindent_verticals};
use crate::types::{Mime, ZmqAddress};

/// Text value.
///
/// Multi-line values keep significant leading whitespace through the
/// vertical bar notation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrKind;

impl OptionKind for StrKind {
    type Value = String;

    fn type_name(&self) -> String {
        String::TYPE_NAME.to_string()
    }

    fn parse(&self, _option: &str, text: &str) -> ConfigResult<String> {
        Ok(unindent_verticals(text))
    }

    fn to_str(&self, value: &String) -> String {
        value.clone()
    }

    fn format(&self, value: &String) -> String {
        let indent = if has_leading_spaces(value) { "   | " } else { "   " };
        prefix_continuation(value, indent)
    }

    fn to_tagged(&self, value: &String) -> TaggedValue {
        TaggedValue::String(value.clone())
    }

    fn from_tagged(&self, _option: &str, value: &TaggedValue) -> ConfigResult<String> {
        match value {
            TaggedValue::String(text) => Ok(text.clone()),
            other => Err(ConfigError::wrong_value_type(other.kind())),
        }
    }
}

/// Integer value, unsigned unless declared [`signed`](ScalarOption::signed)
#[derive(Debug, Clone, Copy, Default)]
pub struct IntKind {
    signed: bool,
}

impl IntKind {
    /// Whether negative values are accepted
    pub fn is_signed(&self) -> bool {
        self.signed
    }
}

impl OptionKind for IntKind {
    type Value = i64;

    fn type_name(&self) -> String {
        i64::TYPE_NAME.to_string()
    }

    fn check(&self, _option: &str, value: &i64) -> ConfigResult<()> {
        if !self.signed && *value < 0 {
            return Err(ConfigError::value("Negative numbers not allowed"));
        }
        Ok(())
    }

    fn parse(&self, _option: &str, text: &str) -> ConfigResult<i64> {
        let trimmed = text.trim();
        trimmed.parse().map_err(|_| {
            ConfigError::value(format!(
                "invalid literal for int() with base 10: '{trimmed}'"
            ))
        })
    }

    fn to_str(&self, value: &i64) -> String {
        value.to_string()
    }

    fn read(&self, source: &IniSource, section: &str, option: &str) -> ConfigResult<i64> {
        source
            .get_i64(section, option)
            .map_err(ConfigError::typed_read)
    }

    fn to_tagged(&self, value: &i64) -> TaggedValue {
        match u64::try_from(*value) {
            Ok(unsigned) if !self.signed => TaggedValue::Uint64(unsigned),
            _ => TaggedValue::Sint64(*value),
        }
    }

    fn from_tagged(&self, option: &str, value: &TaggedValue) -> ConfigResult<i64> {
        match value {
            TaggedValue::Sint64(number) => Ok(*number),
            TaggedValue::Uint64(number) => i64::try_from(*number).map_err(|_| {
                ConfigError::value(format!("Value {number} out of range for option '{option}'"))
            }),
            TaggedValue::String(text) => self.parse(option, text),
            other => Err(ConfigError::wrong_value_type(other.kind())),
        }
    }
}

impl ScalarOption<IntKind> {
    /// Accept negative values
    #[must_use]
    pub fn signed(mut self) -> Self {
        self.kind_mut().signed = true;
        self
    }
}

/// Floating point value
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatKind;

impl OptionKind for FloatKind {
    type Value = f64;

    fn type_name(&self) -> String {
        f64::TYPE_NAME.to_string()
    }

    fn parse(&self, _option: &str, text: &str) -> ConfigResult<f64> {
        Ok(f64::from_config_string(text)?)
    }

    fn to_str(&self, value: &f64) -> String {
        value.to_config_string()
    }

    fn read(&self, source: &IniSource, section: &str, option: &str) -> ConfigResult<f64> {
        source
            .get_f64(section, option)
            .map_err(ConfigError::typed_read)
    }

    fn to_tagged(&self, value: &f64) -> TaggedValue {
        TaggedValue::Double(*value)
    }

    fn from_tagged(&self, option: &str, value: &TaggedValue) -> ConfigResult<f64> {
        match value {
            TaggedValue::Double(number) => Ok(*number),
            TaggedValue::Float(number) => Ok(f64::from(*number)),
            TaggedValue::String(text) => self.parse(option, text),
            other => Err(ConfigError::wrong_value_type(other.kind())),
        }
    }
}

/// Arbitrary precision decimal value, stored in messages as text
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalKind;

impl OptionKind for DecimalKind {
    type Value = Decimal;

    fn type_name(&self) -> String {
        Decimal::TYPE_NAME.to_string()
    }

    fn parse(&self, _option: &str, text: &str) -> ConfigResult<Decimal> {
        Decimal::from_config_string(text).map_err(|err| {
            ConfigError::value_caused_by("Cannot convert string to Decimal", err)
        })
    }

    fn to_str(&self, value: &Decimal) -> String {
        value.to_config_string()
    }

    fn read(&self, source: &IniSource, section: &str, option: &str) -> ConfigResult<Decimal> {
        let text = source.get(section, option)?;
        Decimal::from_config_string(&text).map_err(|err| {
            ConfigError::type_error(format!("Cannot convert '{}' to Decimal: {err}", text.trim()))
        })
    }

    fn to_tagged(&self, value: &Decimal) -> TaggedValue {
        TaggedValue::String(value.to_config_string())
    }

    fn from_tagged(&self, option: &str, value: &TaggedValue) -> ConfigResult<Decimal> {
        match value {
            TaggedValue::Sint64(number) => Ok(Decimal::from(*number)),
            TaggedValue::Uint64(number) => Ok(Decimal::from(*number)),
            TaggedValue::String(text) => self.parse(option, text),
            other => Err(ConfigError::wrong_value_type(other.kind())),
        }
    }
}

/// Boolean value written as `yes`/`no`
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolKind;

impl OptionKind for BoolKind {
    type Value = bool;

    fn type_name(&self) -> String {
        bool::TYPE_NAME.to_string()
    }

    fn parse(&self, _option: &str, text: &str) -> ConfigResult<bool> {
        Ok(parse_bool(text)?)
    }

    fn to_str(&self, value: &bool) -> String {
        value.to_config_string()
    }

    fn read(&self, source: &IniSource, section: &str, option: &str) -> ConfigResult<bool> {
        source
            .get_bool(section, option)
            .map_err(ConfigError::typed_read)
    }

    fn to_tagged(&self, value: &bool) -> TaggedValue {
        TaggedValue::Bool(*value)
    }

    fn from_tagged(&self, option: &str, value: &TaggedValue) -> ConfigResult<bool> {
        match value {
            TaggedValue::Bool(flag) => Ok(*flag),
            TaggedValue::String(text) => self.parse(option, text),
            other => Err(ConfigError::wrong_value_type(other.kind())),
        }
    }
}

/// UUID value, stored in messages as 16 raw bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidKind;

impl OptionKind for UuidKind {
    type Value = Uuid;

    fn type_name(&self) -> String {
        Uuid::TYPE_NAME.to_string()
    }

    fn parse(&self, _option: &str, text: &str) -> ConfigResult<Uuid> {
        Ok(Uuid::from_config_string(text)?)
    }

    fn to_str(&self, value: &Uuid) -> String {
        value.simple().to_string()
    }

    fn format(&self, value: &Uuid) -> String {
        value.to_config_string()
    }

    fn to_tagged(&self, value: &Uuid) -> TaggedValue {
        TaggedValue::Bytes(value.as_bytes().to_vec())
    }

    fn from_tagged(&self, option: &str, value: &TaggedValue) -> ConfigResult<Uuid> {
        match value {
            TaggedValue::Bytes(bytes) => Uuid::from_slice(bytes)
                .map_err(|err| ConfigError::value(format!("bytes is not a 16-char string: {err}"))),
            TaggedValue::String(text) => self.parse(option, text),
            other => Err(ConfigError::wrong_value_type(other.kind())),
        }
    }
}

/// Any [`Convertible`] type stored verbatim as text
///
/// Used for paths, MIME types and ZeroMQ addresses, and available for
/// application types registered with the convertor registry.
pub struct TextKind<T> {
    marker: PhantomData<fn() -> T>,
}

impl<T> Default for TextKind<T> {
    fn default() -> Self {
        Self {
            marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for TextKind<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextKind")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> OptionKind for TextKind<T>
where
    T: Convertible + Clone + PartialEq + std::fmt::Debug + Sync,
{
    type Value = T;

    fn type_name(&self) -> String {
        T::TYPE_NAME.to_string()
    }

    fn parse(&self, _option: &str, text: &str) -> ConfigResult<T> {
        Ok(T::from_config_string(text)?)
    }

    fn to_str(&self, value: &T) -> String {
        value.to_config_string()
    }

    fn to_tagged(&self, value: &T) -> TaggedValue {
        TaggedValue::String(value.to_config_string())
    }

    fn from_tagged(&self, option: &str, value: &TaggedValue) -> ConfigResult<T> {
        match value {
            TaggedValue::String(text) => self.parse(option, text),
            other => Err(ConfigError::wrong_value_type(other.kind())),
        }
    }
}

/// Text option
pub type StrOption = ScalarOption<StrKind>;
/// Integer option
pub type IntOption = ScalarOption<IntKind>;
/// Float option
pub type FloatOption = ScalarOption<FloatKind>;
/// Decimal option
pub type DecimalOption = ScalarOption<DecimalKind>;
/// Boolean option
pub type BoolOption = ScalarOption<BoolKind>;
/// UUID option
pub type UuidOption = ScalarOption<UuidKind>;
/// Filesystem path option; the path is not checked for existence
pub type PathOption = ScalarOption<TextKind<PathBuf>>;
/// MIME type option
pub type MimeOption = ScalarOption<TextKind<Mime>>;
/// ZeroMQ endpoint address option
pub type ZmqAddressOption = ScalarOption<TextKind<ZmqAddress>>;
