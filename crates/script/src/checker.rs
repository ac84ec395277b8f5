//! Pluggable syntax checking for user-code options

use crate::error::{ScriptError, ScriptResult};
use crate::parser::{self, ParsedDefinition};
use crate::signature::Signature;
use std::fmt::Debug;

/// Whether a definition is a function or a class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    /// `def name(...)`
    Function,
    /// `class Name`
    Class,
}

/// A callable definition located in a snippet
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    /// Name of the function or class
    pub name: String,
    /// Function or class
    pub kind: DefinitionKind,
    /// Call signature. For classes this is `__init__` without `self`.
    pub signature: Signature,
}

/// Strategy used by user-code options to validate their source text.
///
/// Implementations only check syntax and locate definitions. They never
/// execute anything.
pub trait SourceChecker: Debug + Send + Sync {
    /// Check that `source` is a single expression
    fn check_expression(&self, source: &str) -> ScriptResult<()>;

    /// Check that `source` is a sequence of statements
    fn check_code(&self, source: &str) -> ScriptResult<()>;

    /// Check `source` and return the callable it defines
    fn find_definition(&self, source: &str) -> ScriptResult<Definition>;
}

/// Default checker for the indentation-structured snippet syntax
///
/// # Examples
///
/// ```
/// use strata_script::{ScriptChecker, SourceChecker};
///
/// let checker = ScriptChecker;
/// assert!(checker.check_expression("a * (b + 1)").is_ok());
/// assert!(checker.check_expression("a = 1").is_err());
///
/// let definition = checker.find_definition("def scale(x, factor=2):\n    return x * factor\n").unwrap();
/// assert_eq!(definition.name, "scale");
/// assert_eq!(definition.signature.to_string(), "(x, factor=2)");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptChecker;

impl SourceChecker for ScriptChecker {
    fn check_expression(&self, source: &str) -> ScriptResult<()> {
        parser::parse_expression(source)
    }

    fn check_code(&self, source: &str) -> ScriptResult<()> {
        parser::parse_module(source).map(|_| ())
    }

    fn find_definition(&self, source: &str) -> ScriptResult<Definition> {
        let declares = |prefix: &str| {
            source
                .lines()
                .any(|line| line.to_lowercase().starts_with(prefix))
        };
        if !declares("def ") && !declares("class ") {
            return Err(ScriptError::DefinitionNotFound);
        }

        let definitions = parser::parse_module(source)?;
        definitions
            .iter()
            .find(|definition| !definition.is_class)
            .or_else(|| definitions.iter().find(|definition| definition.is_class))
            .map(into_definition)
            .ok_or(ScriptError::DefinitionNotFound)
    }
}

fn into_definition(parsed: &ParsedDefinition) -> Definition {
    if parsed.is_class {
        let parameters = parsed
            .init_parameters
            .as_ref()
            .map(|params| params.iter().skip(1).cloned().collect())
            .unwrap_or_default();
        Definition {
            name: parsed.name.clone(),
            kind: DefinitionKind::Class,
            signature: Signature::new(parameters, None),
        }
    } else {
        Definition {
            name: parsed.name.clone(),
            kind: DefinitionKind::Function,
            signature: Signature::new(
                parsed.parameters.clone(),
                parsed.return_annotation.clone(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_signature_drops_self() {
        let source = "class Handler:\n    def __init__(self, name, retries=3):\n        self.name = name\n";
        let definition = ScriptChecker.find_definition(source).unwrap();
        assert_eq!(definition.kind, DefinitionKind::Class);
        assert_eq!(definition.signature.to_string(), "(name, retries=3)");
    }

    #[test]
    fn class_without_init_takes_no_arguments() {
        let definition = ScriptChecker.find_definition("class Empty:\n    pass\n").unwrap();
        assert!(definition.signature.is_empty());
    }

    #[test]
    fn function_wins_over_class() {
        let source = "class First:\n    pass\n\ndef second(a):\n    return a\n";
        let definition = ScriptChecker.find_definition(source).unwrap();
        assert_eq!(definition.name, "second");
        assert_eq!(definition.kind, DefinitionKind::Function);
    }

    #[test]
    fn missing_definition() {
        assert_eq!(
            ScriptChecker.find_definition("x = 1\n").unwrap_err(),
            ScriptError::DefinitionNotFound
        );
    }

    #[test]
    fn syntax_errors_are_reported_before_lookup() {
        let err = ScriptChecker.find_definition("def broken(:\n    pass\n").unwrap_err();
        assert!(matches!(err, ScriptError::Syntax { line: 1, .. }));
    }
}
