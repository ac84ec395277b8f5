//! Structured record option
//!
//! A record is a plain struct whose fields are all registered with the
//! convertor registry. Its text form is a list of `field:value` items, so a
//! record spans several lines of a config file:
//!
//! ```text
//! database =
//!    host:db.example.com
//!    port:15432
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use strata_convert::{ConvertError, ConvertResult, Convertor};
use strata_message::TaggedValue;

use crate::core::error::{ConfigError, ConfigResult};
use crate::core::option::short_type_name;
use crate::options::scalar::{OptionKind, ScalarOption};
use crate::text::{format_items, pick_separator, split_items};

/// Declared field of a [`Record`]
#[derive(Debug, Clone, Copy)]
pub struct RecordField {
    name: &'static str,
    convertor: Convertor,
}

impl RecordField {
    /// Declare a field of type `T`
    ///
    /// # Panics
    ///
    /// Panics if no string convertor is registered for `T`.
    pub fn new<T: 'static>(name: &'static str) -> Self {
        let convertor = strata_convert::global()
            .read()
            .get_by_type(TypeId::of::<T>())
            .copied();
        match convertor {
            Some(convertor) => Self { name, convertor },
            None => panic!(
                "record field '{name}' has type '{}' without a string convertor",
                std::any::type_name::<T>()
            ),
        }
    }

    /// Field name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Simple name of the field type
    pub fn type_name(&self) -> &'static str {
        self.convertor.type_name()
    }
}

/// Field values parsed from record text
#[derive(Default)]
pub struct RecordValues {
    values: HashMap<&'static str, Box<dyn Any + Send>>,
}

impl fmt::Debug for RecordValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

impl RecordValues {
    fn insert(&mut self, field: &'static str, value: Box<dyn Any + Send>) {
        self.values.insert(field, value);
    }

    /// Take the value of an optional field
    ///
    /// Returns `None` when the field was not given or holds another type.
    pub fn take<T: 'static>(&mut self, field: &str) -> Option<T> {
        let value = self.values.remove(field)?;
        value.downcast::<T>().ok().map(|value| *value)
    }

    /// Take the value of a field that must be present
    pub fn require<T: 'static>(&mut self, field: &str) -> ConvertResult<T> {
        self.take(field)
            .ok_or_else(|| ConvertError::missing_field(field))
    }
}

/// A struct stored in a [`RecordOption`]
pub trait Record: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Declared fields, in rendering order
    fn fields() -> Vec<RecordField>;

    /// Value of a declared field
    fn field(&self, name: &str) -> Option<&dyn Any>;

    /// Build the record from parsed field values
    fn from_values(values: RecordValues) -> ConvertResult<Self>;
}

/// Record kind; field declarations are checked when the kind is created
pub struct RecordKind<R> {
    fields: Vec<RecordField>,
    separator: Option<String>,
    marker: PhantomData<fn() -> R>,
}

impl<R: Record> Default for RecordKind<R> {
    fn default() -> Self {
        Self {
            fields: R::fields(),
            separator: None,
            marker: PhantomData,
        }
    }
}

impl<R> fmt::Debug for RecordKind<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<_> = self.fields.iter().map(RecordField::name).collect();
        f.debug_struct("RecordKind")
            .field("record", &std::any::type_name::<R>())
            .field("fields", &fields)
            .field("separator", &self.separator)
            .finish()
    }
}

impl<R: Record> RecordKind<R> {
    /// Declared fields
    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    fn field_items(&self, value: &R) -> Vec<String> {
        self.fields
            .iter()
            .filter_map(|field| {
                let text = self.render_field(field, value)?;
                Some(format!("{}:{text}", field.name))
            })
            .collect()
    }

    fn render_field(&self, field: &RecordField, value: &R) -> Option<String> {
        value
            .field(field.name)
            .and_then(|data| field.convertor.to_string(data).ok())
    }
}

impl<R: Record> OptionKind for RecordKind<R> {
    type Value = R;

    fn type_name(&self) -> String {
        short_type_name(std::any::type_name::<R>())
    }

    fn value_description(&self) -> String {
        "list of values, where each list item defines value for a dataclass field.\n\
         Item format: field_name:value_as_str"
            .to_string()
    }

    fn parse(&self, option: &str, text: &str) -> ConfigResult<R> {
        let mut values = RecordValues::default();
        for item in split_items(text, self.separator.as_deref()) {
            let Some((name, raw)) = item.split_once(':') else {
                return Err(ConfigError::value(format!(
                    "Illegal value '{text}' for option '{option}'"
                )));
            };
            let name = name.trim();
            let field = self
                .fields
                .iter()
                .find(|field| field.name == name)
                .ok_or_else(|| {
                    ConfigError::value(format!(
                        "Unknown data field '{name}' for option '{option}'"
                    ))
                })?;
            values.insert(field.name, field.convertor.from_string(raw.trim())?);
        }
        R::from_values(values).map_err(|err| {
            ConfigError::value_caused_by(
                format!("Illegal value '{text}' for option '{option}'"),
                err,
            )
        })
    }

    fn to_str(&self, value: &R) -> String {
        let items = self.field_items(value);
        let separator = pick_separator(&items, self.separator.as_deref(), ",");
        items.join(separator)
    }

    fn format(&self, value: &R) -> String {
        format_items(&self.field_items(value), self.separator.as_deref())
    }

    fn to_tagged(&self, value: &R) -> TaggedValue {
        TaggedValue::String(self.to_str(value))
    }

    fn from_tagged(&self, option: &str, value: &TaggedValue) -> ConfigResult<R> {
        match value {
            TaggedValue::String(text) => self.parse(option, text),
            other => Err(ConfigError::wrong_value_type(other.kind())),
        }
    }
}

impl<R: Record> ScalarOption<RecordKind<R>> {
    /// Use an explicit item separator
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.kind_mut().separator = Some(separator.into());
        self
    }
}

/// Record option
pub type RecordOption<R> = ScalarOption<RecordKind<R>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::option::ConfigOption;
    use pretty_assertions::assert_eq;
    use std::error::Error as _;
    use strata_ini::IniSource;
    use strata_message::ConfigMessage;

    #[derive(Debug, Clone, PartialEq)]
    struct Endpoint {
        host: String,
        port: i64,
        secure: bool,
    }

    impl Record for Endpoint {
        fn fields() -> Vec<RecordField> {
            vec![
                RecordField::new::<String>("host"),
                RecordField::new::<i64>("port"),
                RecordField::new::<bool>("secure"),
            ]
        }

        fn field(&self, name: &str) -> Option<&dyn Any> {
            match name {
                "host" => Some(&self.host),
                "port" => Some(&self.port),
                "secure" => Some(&self.secure),
                _ => None,
            }
        }

        fn from_values(mut values: RecordValues) -> ConvertResult<Self> {
            Ok(Self {
                host: values.require("host")?,
                port: values.take("port").unwrap_or(5432),
                secure: values.take("secure").unwrap_or(false),
            })
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Opaque;

    #[derive(Debug, Clone, PartialEq)]
    struct Broken(Opaque);

    impl Record for Broken {
        fn fields() -> Vec<RecordField> {
            vec![RecordField::new::<Opaque>("inner")]
        }

        fn field(&self, _name: &str) -> Option<&dyn Any> {
            Some(&self.0)
        }

        fn from_values(mut values: RecordValues) -> ConvertResult<Self> {
            values.require("inner").map(Self)
        }
    }

    fn endpoint(host: &str, port: i64) -> Endpoint {
        Endpoint {
            host: host.to_string(),
            port,
            secure: false,
        }
    }

    #[test]
    fn parses_items_with_field_defaults() {
        let mut opt = RecordOption::<Endpoint>::new("db", "Database");
        opt.set_as_str("host: db.local, port: 15432").unwrap();
        assert_eq!(opt.value(), Some(&endpoint("db.local", 15432)));
        assert_eq!(opt.get_as_str(), "host:db.local,port:15432,secure:no");
        assert_eq!(opt.type_name(), "Endpoint");
    }

    #[test]
    fn loads_multiline_record() {
        let source =
            IniSource::from_text("[app]\ndb =\n    host:db.local\n    secure:yes\n").unwrap();
        let mut opt = RecordOption::<Endpoint>::new("db", "Database");
        opt.load_config(&source, "app").unwrap();
        let value = opt.value().unwrap();
        assert_eq!(value.host, "db.local");
        assert!(value.secure);
    }

    #[test]
    fn unknown_field_is_value_error() {
        let mut opt = RecordOption::<Endpoint>::new("db", "Database");
        let err = opt.set_as_str("host:x, user:sysdba").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert_eq!(
            err.to_string(),
            "Unknown data field 'user' for option 'db'"
        );
    }

    #[test]
    fn missing_field_is_chained() {
        let mut opt = RecordOption::<Endpoint>::new("db", "Database");
        let err = opt.set_as_str("port:1").unwrap_err();
        assert_eq!(err.to_string(), "Illegal value 'port:1' for option 'db'");
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "Missing value for field 'host'");
    }

    #[test]
    fn item_without_colon_is_rejected() {
        let mut opt = RecordOption::<Endpoint>::new("db", "Database");
        let err = opt.set_as_str("host").unwrap_err();
        assert_eq!(err.to_string(), "Illegal value 'host' for option 'db'");
    }

    #[test]
    fn long_record_renders_on_lines() {
        let host = "h".repeat(80);
        let opt = RecordOption::<Endpoint>::new("db", "Database")
            .with_default(endpoint(&host, 1));
        assert_eq!(
            opt.get_formatted(),
            format!("\n   host:{host}\n   port:1\n   secure:no")
        );
        assert!(opt.value_description().contains("\nItem format: field_name:value_as_str"));
    }

    #[test]
    fn proto_round_trip() {
        let mut opt = RecordOption::<Endpoint>::new("db", "Database").with_separator(";");
        opt.set_value(Some(endpoint("db.local", 1))).unwrap();
        let mut message = ConfigMessage::new();
        opt.save_proto(&mut message);
        assert_eq!(
            message.option("db"),
            Some(&TaggedValue::String("host:db.local;port:1;secure:no".into()))
        );
        opt.clear(false);
        opt.load_proto(&message).unwrap();
        assert_eq!(opt.value(), Some(&endpoint("db.local", 1)));
    }

    #[test]
    #[should_panic(expected = "without a string convertor")]
    fn unregistered_field_type_panics() {
        let _ = RecordOption::<Broken>::new("broken", "Broken");
    }
}
