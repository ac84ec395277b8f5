//! # Strata Convert
//!
//! String conversion for configuration value types.
//!
//! - [`Convertible`]: canonical text round trip plus a simple type name
//! - [`ConvertorRegistry`]: type-erased convertors, looked up by type or name
//! - [`global`]: process-wide registry pre-populated with built-in types
//!
//! ```
//! use strata_convert::{Convertible, parse_bool};
//!
//! assert!(parse_bool("Yes").unwrap());
//! assert_eq!(false.to_config_string(), "no");
//! assert_eq!(<i64 as Convertible>::TYPE_NAME, "int");
//! ```

mod convertible;
mod error;
mod registry;

pub use convertible::{
    Convertible, FALSE_LITERALS, INVALID_BOOL_MESSAGE, TRUE_LITERALS, parse_bool,
};
pub use error::{ConvertError, ConvertResult};
pub use registry::{
    Convertor, ConvertorRegistry, convert_from_str, convert_to_str, global, has_convertor,
    register,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{ConvertError, ConvertResult, Convertible, ConvertorRegistry, parse_bool};
}
