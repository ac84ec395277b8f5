//! Checked user-code values
//!
//! These values hold source text that passed a [`SourceChecker`]. They are
//! never executed here; the host application compiles and runs them.

use std::fmt;

use strata_script::{
    Definition, DefinitionKind, ScriptChecker, ScriptResult, Signature, SourceChecker,
};

/// A single expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expression(String);

impl Expression {
    /// Check `source` with the default checker
    pub fn parse(source: impl Into<String>) -> ScriptResult<Self> {
        Self::parse_with(source, &ScriptChecker)
    }

    /// Check `source` with `checker`
    pub fn parse_with(source: impl Into<String>, checker: &dyn SourceChecker) -> ScriptResult<Self> {
        let source = source.into();
        checker.check_expression(&source)?;
        Ok(Self(source))
    }

    /// Source text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A block of statements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Code(String);

impl Code {
    /// Check `source` with the default checker
    pub fn parse(source: impl Into<String>) -> ScriptResult<Self> {
        Self::parse_with(source, &ScriptChecker)
    }

    /// Check `source` with `checker`
    pub fn parse_with(source: impl Into<String>, checker: &dyn SourceChecker) -> ScriptResult<Self> {
        let source = source.into();
        checker.check_code(&source)?;
        Ok(Self(source))
    }

    /// Source text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A function or class definition
///
/// ```
/// use strata_config::types::Callable;
///
/// let callable = Callable::parse("def greet(name: str) -> str:\n    return name\n").unwrap();
/// assert_eq!(callable.name(), "greet");
/// assert_eq!(callable.signature().to_string(), "(name: str) -> str");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Callable {
    source: String,
    definition: Definition,
}

impl Callable {
    /// Check `source` with the default checker and locate its definition
    pub fn parse(source: impl Into<String>) -> ScriptResult<Self> {
        Self::parse_with(source, &ScriptChecker)
    }

    /// Check `source` with `checker` and locate its definition
    pub fn parse_with(source: impl Into<String>, checker: &dyn SourceChecker) -> ScriptResult<Self> {
        let source = source.into();
        let definition = checker.find_definition(&source)?;
        Ok(Self { source, definition })
    }

    /// Name of the function or class
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Function or class
    pub fn kind(&self) -> DefinitionKind {
        self.definition.kind
    }

    /// Call signature
    pub fn signature(&self) -> &Signature {
        &self.definition.signature
    }

    /// Source text
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

macro_rules! impl_source_display {
    ($($ty:ty => $field:tt),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.$field)
                }
            }
        )*
    };
}

impl_source_display!(Expression => 0, Code => 0, Callable => source);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_rejects_statements() {
        assert!(Expression::parse("a + 1").is_ok());
        assert!(Expression::parse("a = 1").is_err());
    }

    #[test]
    fn code_accepts_blocks() {
        let code = Code::parse("total = 0\nfor i in items:\n    total += i\n").unwrap();
        assert!(code.as_str().starts_with("total"));
    }

    #[test]
    fn callable_finds_class() {
        let callable = Callable::parse(
            "class Counter:\n    def __init__(self, start=0):\n        self.value = start\n",
        )
        .unwrap();
        assert_eq!(callable.name(), "Counter");
        assert_eq!(callable.kind(), DefinitionKind::Class);
        assert_eq!(callable.signature().to_string(), "(start=0)");
    }

    #[test]
    fn callable_requires_definition() {
        let err = Callable::parse("print('hello')").unwrap_err();
        assert_eq!(err.to_string(), "Function or class definition not found");
    }
}
