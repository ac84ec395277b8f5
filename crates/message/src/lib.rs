//! # Strata Message
//!
//! Binary container for exchanging configuration trees out of process.
//!
//! A [`ConfigMessage`] maps option names to [`TaggedValue`] scalars and
//! section names to nested messages. The wire form is a compact `postcard`
//! encoding.

mod error;
mod message;
mod value;

pub use error::{MessageError, MessageResult};
pub use message::ConfigMessage;
pub use value::{TaggedValue, ValueKind};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{ConfigMessage, MessageError, MessageResult, TaggedValue, ValueKind};
}
