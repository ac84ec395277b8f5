//! # Strata Config
//!
//! Typed configuration options grouped into sections, with three
//! representations kept in sync: the INI text source, the binary
//! [`ConfigMessage`](strata_message::ConfigMessage) and annotated config
//! text that loads back to the same values.
//!
//! - [`ConfigOption`]: one named, typed and validated value
//! - [`options`]: the option kinds (scalars, enums, flags, lists, records,
//!   user code and section references)
//! - [`Config`]: a section of options and nested sections
//!
//! # Example
//!
//! ```
//! use strata_config::prelude::*;
//! use strata_ini::IniSource;
//! use strata_message::ConfigMessage;
//!
//! let mut server = Config::new("server")
//!     .with_description("HTTP server")
//!     .with_option(StrOption::new("host", "Bind address").required())
//!     .with_option(IntOption::new("port", "Bind port").with_default(8080))
//!     .with_option(BoolOption::new("tls", "Serve over TLS").with_default(false));
//!
//! let source = IniSource::from_text("[server]\nhost = 0.0.0.0\ntls = yes\n").unwrap();
//! server.load_config(&source, None).unwrap();
//! server.validate().unwrap();
//!
//! let mut message = ConfigMessage::new();
//! server.save_proto(&mut message);
//! assert!(message.has_option("tls"));
//!
//! assert_eq!(
//!     server.get_config(true),
//!     "[server]\nhost = 0.0.0.0\n;port = 8080\ntls = yes\n"
//! );
//! ```

pub mod core;
pub mod options;
pub mod text;
pub mod types;

pub use core::{
    AnyValue, Config, ConfigError, ConfigOption, ConfigResult, DEFAULT_TYPE_NAME, ErrorCause,
    ErrorKind, UNDEFINED, render_option,
};

pub use options::{
    BoolOption, CallableOption, CodeOption, ConfigEnum, ConfigListOption, ConfigRefOption,
    DecimalOption, EnumOption, ExpressionOption, FlagOption, FloatOption, IntOption, ListItem,
    ListOption, MimeOption, OptionKind, PathOption, Record, RecordField, RecordOption,
    RecordValues, ScalarOption, StrOption, UuidOption, ZmqAddressOption, decompose,
};

pub use types::{Callable, Code, Expression, Mime, ZmqAddress, ZmqDomain, ZmqTransport};

#[doc(hidden)]
pub mod __private {
    pub use crate::options::enumeration::enum_from_str;
    pub use strata_convert::{ConvertError, ConvertResult, Convertible};
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BoolOption, Config, ConfigEnum, ConfigError, ConfigListOption, ConfigOption,
        ConfigRefOption, ConfigResult, DecimalOption, EnumOption, ErrorKind, FlagOption,
        FloatOption, IntOption, ListOption, PathOption, RecordOption, StrOption, UuidOption,
    };
}
