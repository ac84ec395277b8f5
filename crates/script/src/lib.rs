//! # Strata Script
//!
//! Syntax checking for the script snippets that user-code options carry.
//!
//! Snippets use an indentation-structured scripting syntax. Nothing here
//! evaluates them: the checker validates expressions and statement blocks,
//! and locates the function or class a callable snippet defines so its
//! [`Signature`] can be compared against an expected one.
//!
//! ```
//! use strata_script::{ScriptChecker, Signature, SourceChecker};
//!
//! let expected = Signature::parse("handler(event, context=None)").unwrap();
//! let found = ScriptChecker
//!     .find_definition("def handler(event, context=None):\n    return event\n")
//!     .unwrap();
//! assert_eq!(found.signature, expected);
//! ```

mod checker;
mod error;
mod lexer;
mod parser;
mod signature;
mod span;
mod token;

pub use checker::{Definition, DefinitionKind, ScriptChecker, SourceChecker};
pub use error::{ScriptError, ScriptResult};
pub use lexer::Lexer;
pub use signature::{Parameter, ParameterKind, Signature};
pub use span::Span;
pub use token::{Keyword, Token, TokenKind};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Definition, DefinitionKind, Parameter, ParameterKind, ScriptChecker, ScriptError,
        ScriptResult, Signature, SourceChecker,
    };
}
