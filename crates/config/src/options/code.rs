//! Kinds for user-code values
//!
//! Source text is validated by a pluggable [`SourceChecker`]; the
//! [`ScriptChecker`] is used unless another one is installed with
//! `with_checker`.

use std::sync::Arc;

use strata_message::TaggedValue;
use strata_script::{ScriptChecker, Signature, SourceChecker};

use crate::core::error::{ConfigError, ConfigResult};
use crate::options::scalar::{OptionKind, ScalarOption};
use crate::text::{prefix_continuation, unindent_verticals};
use crate::types::{Callable, Code, Expression};

fn default_checker() -> Arc<dyn SourceChecker> {
    Arc::new(ScriptChecker)
}

fn string_field(value: &TaggedValue) -> ConfigResult<&str> {
    match value {
        TaggedValue::String(text) => Ok(text),
        other => Err(ConfigError::wrong_value_type(other.kind())),
    }
}

/// Single expression
#[derive(Debug, Clone)]
pub struct ExpressionKind {
    checker: Arc<dyn SourceChecker>,
}

impl Default for ExpressionKind {
    fn default() -> Self {
        Self {
            checker: default_checker(),
        }
    }
}

impl OptionKind for ExpressionKind {
    type Value = Expression;

    fn type_name(&self) -> String {
        "expression".to_string()
    }

    fn parse(&self, _option: &str, text: &str) -> ConfigResult<Expression> {
        Ok(Expression::parse_with(text, self.checker.as_ref())?)
    }

    fn to_str(&self, value: &Expression) -> String {
        value.to_string()
    }

    fn format(&self, value: &Expression) -> String {
        prefix_continuation(value.as_str(), "   ")
    }

    fn to_tagged(&self, value: &Expression) -> TaggedValue {
        TaggedValue::String(value.to_string())
    }

    fn from_tagged(&self, option: &str, value: &TaggedValue) -> ConfigResult<Expression> {
        self.parse(option, string_field(value)?)
    }
}

/// Block of statements
#[derive(Debug, Clone)]
pub struct CodeKind {
    checker: Arc<dyn SourceChecker>,
}

impl Default for CodeKind {
    fn default() -> Self {
        Self {
            checker: default_checker(),
        }
    }
}

impl OptionKind for CodeKind {
    type Value = Code;

    fn type_name(&self) -> String {
        "code".to_string()
    }

    fn parse(&self, _option: &str, text: &str) -> ConfigResult<Code> {
        Ok(Code::parse_with(unindent_verticals(text), self.checker.as_ref())?)
    }

    fn to_str(&self, value: &Code) -> String {
        value.to_string()
    }

    fn format(&self, value: &Code) -> String {
        prefix_continuation(value.as_str(), "   | ")
    }

    fn to_tagged(&self, value: &Code) -> TaggedValue {
        TaggedValue::String(value.to_string())
    }

    fn from_tagged(&self, option: &str, value: &TaggedValue) -> ConfigResult<Code> {
        self.parse(option, string_field(value)?)
    }
}

/// Function or class definition matching an expected signature
#[derive(Debug, Clone)]
pub struct CallableKind {
    signature: Signature,
    checker: Arc<dyn SourceChecker>,
}

impl CallableKind {
    /// Expect definitions with `signature`
    pub fn new(signature: Signature) -> Self {
        Self {
            signature,
            checker: default_checker(),
        }
    }

    /// Expect definitions matching a header such as `name(a: int, b=1) -> bool`
    pub fn from_header(header: &str) -> ConfigResult<Self> {
        Ok(Self::new(Signature::parse(header)?))
    }

    /// Expected signature
    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl OptionKind for CallableKind {
    type Value = Callable;

    fn type_name(&self) -> String {
        "callable".to_string()
    }

    fn value_description(&self) -> String {
        format!("callable [{}]", self.signature)
    }

    fn check(&self, _option: &str, value: &Callable) -> ConfigResult<()> {
        let actual = value.signature();
        if actual.return_annotation() != self.signature.return_annotation() {
            return Err(ConfigError::value("Wrong callable return type"));
        }
        if actual.len() != self.signature.len() {
            return Err(ConfigError::value("Wrong number of parameters"));
        }
        for expected in self.signature.parameters() {
            let name = &expected.name;
            let Some(found) = actual.parameter(name) else {
                return Err(ConfigError::value(format!("Missing parameter '{name}'")));
            };
            if found.annotation != expected.annotation {
                return Err(ConfigError::value(format!("Wrong type, parameter '{name}'")));
            }
            if found.default != expected.default {
                return Err(ConfigError::value(format!("Wrong default, parameter '{name}'")));
            }
            if found.kind != expected.kind {
                return Err(ConfigError::value(format!(
                    "Wrong parameter kind, parameter '{name}'"
                )));
            }
        }
        Ok(())
    }

    fn parse(&self, _option: &str, text: &str) -> ConfigResult<Callable> {
        Ok(Callable::parse_with(unindent_verticals(text), self.checker.as_ref())?)
    }

    fn to_str(&self, value: &Callable) -> String {
        value.to_string()
    }

    fn format(&self, value: &Callable) -> String {
        prefix_continuation(value.as_str(), "   | ")
    }

    fn to_tagged(&self, value: &Callable) -> TaggedValue {
        TaggedValue::String(value.to_string())
    }

    fn from_tagged(&self, option: &str, value: &TaggedValue) -> ConfigResult<Callable> {
        self.parse(option, string_field(value)?)
    }
}

macro_rules! impl_with_checker {
    ($($kind:ty),*) => {
        $(
            impl ScalarOption<$kind> {
                /// Validate source text with `checker`
                #[must_use]
                pub fn with_checker(mut self, checker: Arc<dyn SourceChecker>) -> Self {
                    self.kind_mut().checker = checker;
                    self
                }
            }
        )*
    };
}

impl_with_checker!(ExpressionKind, CodeKind, CallableKind);

impl ScalarOption<CallableKind> {
    /// Create a callable option expecting `signature`
    ///
    /// # Panics
    ///
    /// Panics if `name` or `description` is empty.
    pub fn callable(
        name: impl Into<String>,
        description: impl Into<String>,
        signature: Signature,
    ) -> Self {
        Self::with_kind(name, description, CallableKind::new(signature))
    }
}

/// Expression option
pub type ExpressionOption = ScalarOption<ExpressionKind>;
/// Code block option
pub type CodeOption = ScalarOption<CodeKind>;
/// Callable definition option
pub type CallableOption = ScalarOption<CallableKind>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::option::ConfigOption;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn scale_option() -> CallableOption {
        CallableOption::callable(
            "scale",
            "Scaling function",
            Signature::parse("scale(value: int, factor: int = 2) -> int").unwrap(),
        )
    }

    #[test]
    fn expression_keeps_text_and_indents_continuations() {
        let mut opt = ExpressionOption::new("expr", "Expression");
        opt.set_as_str("(a +\nb)").unwrap();
        assert_eq!(opt.get_as_str(), "(a +\nb)");
        assert_eq!(opt.get_formatted(), "(a +\n   b)");
    }

    #[test]
    fn expression_syntax_error_kind() {
        let mut opt = ExpressionOption::new("expr", "Expression");
        let err = opt.set_as_str("a = ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn code_unindents_verticals() {
        let mut opt = CodeOption::new("code", "Code");
        opt.set_as_str("x = 1\n|if ready:\n|    go()\n").unwrap();
        assert_eq!(opt.get_as_str(), "x = 1\nif ready:\n    go()\n");
        assert_eq!(opt.get_formatted(), "x = 1\n   | if ready:\n   |     go()\n");
    }

    #[test]
    fn callable_matching_signature_is_accepted() {
        let mut opt = scale_option();
        opt.set_as_str("def scale(value: int, factor: int = 2) -> int:\n    return value * factor\n")
            .unwrap();
        assert_eq!(opt.value().map(Callable::name), Some("scale"));
        assert_eq!(
            opt.value_description(),
            "callable [(value: int, factor: int = 2) -> int]"
        );
    }

    #[rstest]
    #[case("def f(value: int, factor: int = 2):\n    pass\n", "Wrong callable return type")]
    #[case("def f(value: int) -> int:\n    pass\n", "Wrong number of parameters")]
    #[case("def f(value: int, scale: int = 2) -> int:\n    pass\n", "Missing parameter 'factor'")]
    #[case("def f(value: str, factor: int = 2) -> int:\n    pass\n", "Wrong type, parameter 'value'")]
    #[case("def f(value: int, factor: int = 3) -> int:\n    pass\n", "Wrong default, parameter 'factor'")]
    #[case("def f(value: int, *, factor: int = 2) -> int:\n    pass\n", "Wrong parameter kind, parameter 'factor'")]
    fn callable_mismatch(#[case] source: &str, #[case] message: &str) {
        let mut opt = scale_option();
        let err = opt.set_as_str(source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert_eq!(err.to_string(), message);
    }

    #[test]
    fn callable_without_definition_is_value_error() {
        let mut opt = scale_option();
        let err = opt.set_as_str("value * 2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
    }
}
