//! # Strata INI
//!
//! Reader for INI-style `[section]` / `key = value` text used as the textual
//! source of Strata configurations.
//!
//! ## Features
//!
//! - **Default section**: `[DEFAULT]` values act as fallbacks for every section
//! - **Multi-line values**: indented continuation lines, empty lines kept
//! - **Typed accessors**: [`IniSource::get_i64`], [`IniSource::get_f64`], [`IniSource::get_bool`]
//! - **Interpolation**: `${key}`, `${section:key}` and `${env:VAR}` references
//!
//! ```
//! use strata_ini::IniSource;
//!
//! let source = IniSource::from_text("[DEFAULT]\nhost = localhost\n[db]\ndsn = ${host}:3050\n").unwrap();
//! assert_eq!(source.get("db", "dsn").unwrap(), "localhost:3050");
//! ```

mod error;
mod interpolation;
mod options;
mod parser;
mod source;

pub use error::{IniError, IniResult};
pub use interpolation::{
    ENV_SECTION, EnvExtendedInterpolation, ExtendedInterpolation, Interpolation,
    MAX_INTERPOLATION_DEPTH, NoInterpolation,
};
pub use options::{DEFAULT_SECTION, IniOptions};
pub use source::IniSource;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        DEFAULT_SECTION, EnvExtendedInterpolation, ExtendedInterpolation, IniError, IniOptions,
        IniResult, IniSource, Interpolation, NoInterpolation,
    };
}
