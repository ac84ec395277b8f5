//! Core option and section model

pub mod config;
pub mod error;
pub mod option;

pub use config::{Config, DEFAULT_TYPE_NAME};
pub use error::{ConfigError, ConfigResult, ErrorCause, ErrorKind};
pub use option::{AnyValue, ConfigOption, UNDEFINED, render_option, short_type_name};
