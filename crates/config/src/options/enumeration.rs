//! Enumeration kind and the [`config_enum!`](crate::config_enum) macro

use std::fmt;

use strata_convert::{ConvertError, ConvertResult};
use strata_message::TaggedValue;

use crate::core::error::{ConfigError, ConfigResult};
use crate::options::scalar::{OptionKind, ScalarOption};

/// Enumeration usable as an option value.
///
/// Usually implemented with [`config_enum!`](crate::config_enum).
pub trait ConfigEnum: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Type name used in messages
    const TYPE_NAME: &'static str;

    /// All members in declaration order
    fn members() -> &'static [Self];

    /// Canonical member name
    fn name(self) -> &'static str;

    /// Extra names resolving to a member
    fn aliases() -> &'static [(&'static str, Self)] {
        &[]
    }

    /// Find a member by name or alias, ignoring case
    fn from_name(name: &str) -> Option<Self> {
        Self::members()
            .iter()
            .copied()
            .find(|member| member.name().eq_ignore_ascii_case(name))
            .or_else(|| {
                Self::aliases()
                    .iter()
                    .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
                    .map(|(_, member)| *member)
            })
    }
}

/// Parse a member name, as used by the convertor generated by [`config_enum!`](crate::config_enum)
pub fn enum_from_str<E: ConfigEnum>(text: &str) -> ConvertResult<E> {
    E::from_name(text.trim()).ok_or_else(|| {
        ConvertError::invalid_value(
            E::TYPE_NAME,
            format!("Illegal value '{text}' for enum type '{}'", E::TYPE_NAME),
        )
    })
}

/// Declare an enumeration usable by [`EnumOption`] and list options
///
/// The generated type derives `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`
/// and `Hash`, and implements [`ConfigEnum`] and
/// [`Convertible`](strata_convert::Convertible).
///
/// ```
/// use strata_config::{ConfigEnum, config_enum};
///
/// config_enum! {
///     /// Worker state
///     pub enum State {
///         Ready = 1 => "READY",
///         Running = 2 => "RUNNING",
///     }
///     aliases {
///         "CREATED" => Ready,
///     }
/// }
///
/// assert_eq!(State::from_name("running"), Some(State::Running));
/// assert_eq!(State::from_name("Created"), Some(State::Ready));
/// assert_eq!(State::Ready.name(), "READY");
/// ```
#[macro_export]
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal => $text:literal ),+ $(,)?
        }
        $( aliases { $( $alias:literal => $target:ident ),* $(,)? } )?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl $crate::ConfigEnum for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn members() -> &'static [Self] {
                &[ $( Self::$variant ),+ ]
            }

            fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }

            fn aliases() -> &'static [(&'static str, Self)] {
                &[ $( $( ($alias, Self::$target) ),* )? ]
            }
        }

        impl $crate::__private::Convertible for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn to_config_string(&self) -> ::std::string::String {
                ::std::string::ToString::to_string(<Self as $crate::ConfigEnum>::name(*self))
            }

            fn from_config_string(text: &str) -> $crate::__private::ConvertResult<Self> {
                $crate::__private::enum_from_str(text)
            }
        }
    };
}

/// Member of an enumeration, restricted to an allowed subset
pub struct EnumKind<E: ConfigEnum> {
    allowed: Vec<E>,
}

impl<E: ConfigEnum> Default for EnumKind<E> {
    fn default() -> Self {
        Self {
            allowed: E::members().to_vec(),
        }
    }
}

impl<E: ConfigEnum> fmt::Debug for EnumKind<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumKind")
            .field("type", &E::TYPE_NAME)
            .field("allowed", &self.allowed)
            .finish()
    }
}

impl<E: ConfigEnum> EnumKind<E> {
    /// Allowed members
    pub fn allowed(&self) -> &[E] {
        &self.allowed
    }
}

impl<E: ConfigEnum> OptionKind for EnumKind<E> {
    type Value = E;

    fn type_name(&self) -> String {
        E::TYPE_NAME.to_string()
    }

    fn value_description(&self) -> String {
        let names: Vec<String> = self
            .allowed
            .iter()
            .map(|member| member.name().to_lowercase())
            .collect();
        format!("enum [{}]", names.join(", "))
    }

    fn check(&self, _option: &str, value: &E) -> ConfigResult<()> {
        if self.allowed.contains(value) {
            Ok(())
        } else {
            Err(ConfigError::value(format!(
                "Value '{}.{}' not allowed",
                E::TYPE_NAME,
                value.name()
            )))
        }
    }

    fn parse(&self, _option: &str, text: &str) -> ConfigResult<E> {
        E::from_name(text.trim())
            .filter(|member| self.allowed.contains(member))
            .ok_or_else(|| {
                ConfigError::value(format!(
                    "Illegal value '{text}' for enum type '{}'",
                    E::TYPE_NAME
                ))
            })
    }

    fn to_str(&self, value: &E) -> String {
        value.name().to_string()
    }

    fn format(&self, value: &E) -> String {
        value.name().to_lowercase()
    }

    fn to_tagged(&self, value: &E) -> TaggedValue {
        TaggedValue::String(value.name().to_string())
    }

    fn from_tagged(&self, option: &str, value: &TaggedValue) -> ConfigResult<E> {
        match value {
            TaggedValue::String(text) => self.parse(option, text),
            other => Err(ConfigError::wrong_value_type(other.kind())),
        }
    }
}

impl<E: ConfigEnum> ScalarOption<EnumKind<E>> {
    /// Restrict the accepted members
    #[must_use]
    pub fn with_allowed(mut self, allowed: impl IntoIterator<Item = E>) -> Self {
        self.kind_mut().allowed = allowed.into_iter().collect();
        self
    }
}

/// Enumeration option
pub type EnumOption<E> = ScalarOption<EnumKind<E>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::option::ConfigOption;
    use pretty_assertions::assert_eq;
    use strata_convert::Convertible;
    use strata_message::ConfigMessage;

    crate::config_enum! {
        enum Status {
            Ready = 1 => "READY",
            Running = 2 => "RUNNING",
            Stopped = 3 => "STOPPED",
        }
        aliases {
            "CREATED" => Ready,
        }
    }

    #[test]
    fn names_are_case_insensitive() {
        let mut opt = EnumOption::<Status>::new("status", "Status");
        opt.set_as_str("ready").unwrap();
        assert_eq!(opt.value(), Some(&Status::Ready));
        opt.set_as_str("RUNNING").unwrap();
        assert_eq!(opt.value(), Some(&Status::Running));
        opt.set_as_str("Created").unwrap();
        assert_eq!(opt.value(), Some(&Status::Ready));
        assert_eq!(opt.get_as_str(), "READY");
        assert_eq!(opt.get_formatted(), "ready");
    }

    #[test]
    fn unknown_name_is_rejected() {
        let mut opt = EnumOption::<Status>::new("status", "Status");
        let err = opt.set_as_str("paused").unwrap_err();
        assert_eq!(err.to_string(), "Illegal value 'paused' for enum type 'Status'");
    }

    #[test]
    fn allowed_subset_is_enforced() {
        let mut opt =
            EnumOption::<Status>::new("status", "Status").with_allowed([Status::Ready, Status::Running]);
        assert_eq!(opt.value_description(), "enum [ready, running]");

        let err = opt.set_value(Some(Status::Stopped)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert_eq!(err.to_string(), "Value 'Status.STOPPED' not allowed");
        assert!(opt.set_as_str("stopped").is_err());
    }

    #[test]
    fn message_accepts_names_only() {
        let mut opt = EnumOption::<Status>::new("status", "Status");
        let mut message = ConfigMessage::new();
        message.set_option("status", 2_i64);
        assert_eq!(
            opt.load_proto(&message).unwrap_err().to_string(),
            "Wrong value type: sint64"
        );

        message.set_option("status", "running");
        opt.load_proto(&message).unwrap();
        assert_eq!(opt.value(), Some(&Status::Running));
    }

    #[test]
    fn convertible_uses_canonical_name() {
        assert_eq!(Status::Stopped.to_config_string(), "STOPPED");
        assert_eq!(Status::from_config_string("created").unwrap(), Status::Ready);
        assert_eq!(<Status as Convertible>::TYPE_NAME, "Status");
    }
}
