//! Option kinds
//!
//! Most kinds are a [`ScalarOption`] over an [`OptionKind`]; the options
//! naming other sections implement [`ConfigOption`](crate::ConfigOption)
//! directly.

pub mod basic;
pub mod code;
pub mod enumeration;
pub mod flag;
pub mod list;
pub mod record;
pub mod reference;
pub mod scalar;

pub use basic::{
    BoolKind, BoolOption, DecimalKind, DecimalOption, FloatKind, FloatOption, IntKind, IntOption,
    MimeOption, PathOption, StrKind, StrOption, TextKind, UuidKind, UuidOption, ZmqAddressOption,
};
pub use code::{
    CallableKind, CallableOption, CodeKind, CodeOption, ExpressionKind, ExpressionOption,
};
pub use enumeration::{ConfigEnum, EnumKind, EnumOption, enum_from_str};
pub use flag::{FlagKind, FlagOption, FlagPart, decompose};
pub use list::{ListItem, ListKind, ListOption};
pub use record::{Record, RecordField, RecordKind, RecordOption, RecordValues};
pub use reference::{ConfigFactory, ConfigListOption, ConfigRefOption};
pub use scalar::{OptionKind, ScalarOption};
