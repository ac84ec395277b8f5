//! String conversion for configuration value types
//!
//! [`Convertible`] is the contract every value type stored in a configuration
//! option or record field fulfils: a stable simple type name plus a lossless
//! round trip through text.

use crate::error::{ConvertError, ConvertResult};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

/// Literals accepted as boolean `true` (compared case-insensitively).
pub const TRUE_LITERALS: &[&str] = &["yes", "true", "on", "y", "1"];

/// Literals accepted as boolean `false` (compared case-insensitively).
pub const FALSE_LITERALS: &[&str] = &["no", "false", "off", "n", "0"];

/// Message used when text is not one of the boolean literals.
pub const INVALID_BOOL_MESSAGE: &str = "Value is not a valid bool string constant";

/// Parse one of the shared yes/no literals.
///
/// Surrounding whitespace is ignored and the comparison is case-insensitive.
pub fn parse_bool(text: &str) -> ConvertResult<bool> {
    let lowered = text.trim().to_lowercase();
    if TRUE_LITERALS.contains(&lowered.as_str()) {
        Ok(true)
    } else if FALSE_LITERALS.contains(&lowered.as_str()) {
        Ok(false)
    } else {
        Err(ConvertError::invalid_value(bool::TYPE_NAME, INVALID_BOOL_MESSAGE))
    }
}

/// A value type with a canonical string form.
pub trait Convertible: Sized + Send + 'static {
    /// Simple type name used in annotations and type-prefixed list items
    const TYPE_NAME: &'static str;

    /// Render the value in its canonical text form
    fn to_config_string(&self) -> String;

    /// Parse a value from text
    fn from_config_string(text: &str) -> ConvertResult<Self>;
}

impl Convertible for String {
    const TYPE_NAME: &'static str = "str";

    fn to_config_string(&self) -> String {
        self.clone()
    }

    fn from_config_string(text: &str) -> ConvertResult<Self> {
        Ok(text.to_string())
    }
}

impl Convertible for bool {
    const TYPE_NAME: &'static str = "bool";

    fn to_config_string(&self) -> String {
        if *self { "yes" } else { "no" }.to_string()
    }

    fn from_config_string(text: &str) -> ConvertResult<Self> {
        parse_bool(text)
    }
}

macro_rules! impl_convertible_number {
    ($($ty:ty => $name:literal, $kind:literal, $render:literal;)*) => {
        $(
            impl Convertible for $ty {
                const TYPE_NAME: &'static str = $name;

                fn to_config_string(&self) -> String {
                    format!($render, self)
                }

                fn from_config_string(text: &str) -> ConvertResult<Self> {
                    let trimmed = text.trim();
                    trimmed.parse::<$ty>().map_err(|_| {
                        ConvertError::invalid_value(
                            $name,
                            format!("invalid literal for {}: '{}'", $kind, trimmed),
                        )
                    })
                }
            }
        )*
    };
}

impl_convertible_number! {
    i64 => "int", "int", "{}";
    i32 => "i32", "int", "{}";
    i16 => "i16", "int", "{}";
    i8 => "i8", "int", "{}";
    u64 => "u64", "int", "{}";
    u32 => "u32", "int", "{}";
    u16 => "u16", "int", "{}";
    u8 => "u8", "int", "{}";
    f64 => "float", "float", "{:?}";
    f32 => "f32", "float", "{:?}";
}

impl Convertible for Decimal {
    const TYPE_NAME: &'static str = "Decimal";

    fn to_config_string(&self) -> String {
        self.to_string()
    }

    fn from_config_string(text: &str) -> ConvertResult<Self> {
        let trimmed = text.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| {
                ConvertError::invalid_value(Self::TYPE_NAME, "Cannot convert string to Decimal")
            })
    }
}

impl Convertible for Uuid {
    const TYPE_NAME: &'static str = "UUID";

    fn to_config_string(&self) -> String {
        self.hyphenated().to_string()
    }

    fn from_config_string(text: &str) -> ConvertResult<Self> {
        Uuid::parse_str(text.trim()).map_err(|err| {
            ConvertError::invalid_value(Self::TYPE_NAME, format!("badly formed UUID string: {err}"))
        })
    }
}

impl Convertible for PathBuf {
    const TYPE_NAME: &'static str = "Path";

    fn to_config_string(&self) -> String {
        self.to_string_lossy().into_owned()
    }

    fn from_config_string(text: &str) -> ConvertResult<Self> {
        Ok(PathBuf::from(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("yes", true)]
    #[case("TRUE", true)]
    #[case(" on ", true)]
    #[case("Y", true)]
    #[case("1", true)]
    #[case("no", false)]
    #[case("False", false)]
    #[case("OFF", false)]
    #[case("n", false)]
    #[case("0", false)]
    fn bool_literals(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(parse_bool(text).unwrap(), expected);
    }

    #[test]
    fn bool_rejects_unknown_literal() {
        let err = parse_bool("maybe").unwrap_err();
        assert!(err.to_string().contains("not a valid bool"));
    }

    #[test]
    fn bool_renders_yes_no() {
        assert_eq!(true.to_config_string(), "yes");
        assert_eq!(false.to_config_string(), "no");
    }

    #[test]
    fn float_keeps_fraction_marker() {
        assert_eq!(1.0_f64.to_config_string(), "1.0");
        assert_eq!(f64::from_config_string(" 2.5 ").unwrap(), 2.5);
    }

    #[test]
    fn int_parse_failure_names_literal() {
        let err = i64::from_config_string("ten").unwrap_err();
        assert_eq!(err.to_string(), "invalid literal for int: 'ten'");
    }

    #[test]
    fn uuid_accepts_hex_and_canonical() {
        let canonical = "0a7fd53a-1b5c-4b8e-9f25-7b2a5e0c4d11";
        let from_canonical = Uuid::from_config_string(canonical).unwrap();
        let from_hex = Uuid::from_config_string(&canonical.replace('-', "")).unwrap();
        assert_eq!(from_canonical, from_hex);
        assert_eq!(from_hex.to_config_string(), canonical);
    }

    #[test]
    fn decimal_exact_text() {
        let value = Decimal::from_config_string("123.4500").unwrap();
        assert_eq!(value.to_config_string(), "123.4500");
        assert!(Decimal::from_config_string("12x").is_err());
    }
}
