//! Value types with their own validation rules

mod mime;
mod source;
mod zmq;

pub use mime::{MIME_TYPES, Mime};
pub use source::{Callable, Code, Expression};
pub use zmq::{ZmqAddress, ZmqDomain, ZmqTransport};
