//! List option over one or several item types

use std::fmt;
use std::marker::PhantomData;

use strata_convert::{ConvertResult, Convertible};
use strata_message::TaggedValue;

use crate::core::error::{ConfigError, ConfigResult};
use crate::options::scalar::{OptionKind, ScalarOption};
use crate::text::{format_items, pick_separator, split_items};

/// Item of a list option
///
/// Every [`Convertible`] type is a single-type item. Lists mixing several
/// types use an enum declared with [`list_item!`](crate::list_item), whose
/// items are written as `TypeName:value`.
pub trait ListItem: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Names of the accepted item types
    fn item_types() -> Vec<&'static str>;

    /// Type name of this item
    fn item_type(&self) -> &'static str;

    /// Text form of the item without a type prefix
    fn item_to_string(&self) -> String;

    /// Parse an item of the named type
    fn item_from_string(type_name: &str, text: &str) -> ConvertResult<Self>;
}

impl<T: Convertible + Clone + PartialEq + fmt::Debug + Sync> ListItem for T {
    fn item_types() -> Vec<&'static str> {
        vec![T::TYPE_NAME]
    }

    fn item_type(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn item_to_string(&self) -> String {
        self.to_config_string()
    }

    fn item_from_string(_type_name: &str, text: &str) -> ConvertResult<Self> {
        T::from_config_string(text)
    }
}

/// Declare an enum usable as the item of a multi-type list
///
/// Each variant wraps one [`Convertible`](strata_convert::Convertible)
/// type; the type's simple name is the item prefix.
///
/// ```
/// use strata_config::{ConfigOption, ListOption, list_item};
///
/// list_item! {
///     pub enum Value {
///         Int(i64),
///         Text(String),
///     }
/// }
///
/// let mut opt = ListOption::<Value>::new("values", "Mixed values");
/// opt.set_as_str("int:1, str:two").unwrap();
/// assert_eq!(
///     opt.value(),
///     Some(&vec![Value::Int(1), Value::Text("two".into())])
/// );
/// ```
#[macro_export]
macro_rules! list_item {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident($ty:ty)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis enum $name {
            $($variant($ty)),+
        }

        impl $crate::options::ListItem for $name {
            fn item_types() -> ::std::vec::Vec<&'static str> {
                ::std::vec![$(<$ty as $crate::__private::Convertible>::TYPE_NAME),+]
            }

            fn item_type(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => <$ty as $crate::__private::Convertible>::TYPE_NAME),+
                }
            }

            fn item_to_string(&self) -> ::std::string::String {
                match self {
                    $(Self::$variant(value) => $crate::__private::Convertible::to_config_string(value)),+
                }
            }

            fn item_from_string(
                type_name: &str,
                text: &str,
            ) -> $crate::__private::ConvertResult<Self> {
                $(
                    if type_name == <$ty as $crate::__private::Convertible>::TYPE_NAME {
                        return <$ty as $crate::__private::Convertible>::from_config_string(text)
                            .map(Self::$variant);
                    }
                )+
                Err($crate::__private::ConvertError::unregistered(type_name))
            }
        }
    };
}

/// List of items, separated by a comma or a line break
pub struct ListKind<T> {
    item_types: Vec<&'static str>,
    separator: Option<String>,
    marker: PhantomData<fn() -> T>,
}

impl<T: ListItem> Default for ListKind<T> {
    fn default() -> Self {
        Self {
            item_types: T::item_types(),
            separator: None,
            marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ListKind<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListKind")
            .field("item_types", &self.item_types)
            .field("separator", &self.separator)
            .finish()
    }
}

impl<T: ListItem> ListKind<T> {
    /// Accepted item type names
    pub fn item_types(&self) -> &[&'static str] {
        &self.item_types
    }

    /// Explicit item separator, if any
    pub fn separator(&self) -> Option<&str> {
        self.separator.as_deref()
    }

    fn is_mixed() -> bool {
        T::item_types().len() > 1
    }

    fn typed_items(values: &[T]) -> Vec<String> {
        values
            .iter()
            .map(|item| {
                if Self::is_mixed() {
                    format!("{}:{}", item.item_type(), item.item_to_string())
                } else {
                    item.item_to_string()
                }
            })
            .collect()
    }

    fn parse_item(&self, item: &str) -> ConfigResult<T> {
        if !Self::is_mixed() {
            return Ok(T::item_from_string(self.item_types[0], item)?);
        }
        let (type_name, text) = item.split_once(':').unwrap_or((item, ""));
        let type_name = type_name.trim();
        if !self.item_types.contains(&type_name) {
            return Err(ConfigError::value(format!(
                "Item type '{type_name}' not supported"
            )));
        }
        T::item_from_string(type_name, text.trim()).map_err(ConfigError::from)
    }
}

impl<T: ListItem> OptionKind for ListKind<T> {
    type Value = Vec<T>;

    fn type_name(&self) -> String {
        "list".to_string()
    }

    fn value_description(&self) -> String {
        format!("list [{}]", self.item_types.join(", "))
    }

    fn check(&self, _option: &str, value: &Vec<T>) -> ConfigResult<()> {
        for (index, item) in value.iter().enumerate() {
            if !self.item_types.contains(&item.item_type()) {
                return Err(ConfigError::value(format!(
                    "List item[{index}] has wrong type"
                )));
            }
        }
        Ok(())
    }

    fn parse(&self, _option: &str, text: &str) -> ConfigResult<Vec<T>> {
        split_items(text, self.separator.as_deref())
            .into_iter()
            .map(|item| self.parse_item(item))
            .collect()
    }

    fn to_str(&self, value: &Vec<T>) -> String {
        let items = Self::typed_items(value);
        let separator = pick_separator(&items, self.separator.as_deref(), ",");
        items.join(separator)
    }

    fn format(&self, value: &Vec<T>) -> String {
        format_items(&Self::typed_items(value), self.separator.as_deref())
    }

    fn to_tagged(&self, value: &Vec<T>) -> TaggedValue {
        TaggedValue::String(self.to_str(value))
    }

    fn from_tagged(&self, option: &str, value: &TaggedValue) -> ConfigResult<Vec<T>> {
        match value {
            TaggedValue::String(text) => self.parse(option, text),
            other => Err(ConfigError::wrong_value_type(other.kind())),
        }
    }
}

impl<T: ListItem> ScalarOption<ListKind<T>> {
    /// Use an explicit item separator
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.kind_mut().separator = Some(separator.into());
        self
    }

    /// Restrict the accepted item types of a multi-type list
    ///
    /// # Panics
    ///
    /// Panics if a name is not one of the item types of `T`.
    #[must_use]
    pub fn with_item_types(mut self, item_types: &[&str]) -> Self {
        let known = T::item_types();
        let selected = item_types
            .iter()
            .map(|name| {
                known
                    .iter()
                    .copied()
                    .find(|known| known == name)
                    .unwrap_or_else(|| panic!("unknown list item type '{name}'"))
            })
            .collect();
        self.kind_mut().item_types = selected;
        self
    }
}

/// List option
pub type ListOption<T> = ScalarOption<ListKind<T>>;
