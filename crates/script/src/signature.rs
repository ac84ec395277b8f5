//! Callable signature model

use crate::checker::{ScriptChecker, SourceChecker};
use crate::error::ScriptResult;
use std::fmt;

/// How an argument binds to a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Declared before `/`
    PositionalOnly,
    /// Ordinary parameter
    PositionalOrKeyword,
    /// `*args`
    VarPositional,
    /// Declared after `*` or `*args`
    KeywordOnly,
    /// `**kwargs`
    VarKeyword,
}

/// One declared parameter.
///
/// Annotation and default are kept as normalized source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    pub annotation: Option<String>,
    pub default: Option<String>,
}

impl Parameter {
    /// Create a parameter without annotation or default
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            annotation: None,
            default: None,
        }
    }

    /// Set the annotation text
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    /// Set the default value text
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParameterKind::VarPositional => write!(f, "*")?,
            ParameterKind::VarKeyword => write!(f, "**")?,
            _ => {}
        }
        write!(f, "{}", self.name)?;
        if let Some(annotation) = &self.annotation {
            write!(f, ": {annotation}")?;
        }
        if let Some(default) = &self.default {
            if self.annotation.is_some() {
                write!(f, " = {default}")?;
            } else {
                write!(f, "={default}")?;
            }
        }
        Ok(())
    }
}

/// Parameters and return annotation of a function or class constructor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    parameters: Vec<Parameter>,
    return_annotation: Option<String>,
}

impl Signature {
    /// Create a signature from its parts
    pub fn new(parameters: Vec<Parameter>, return_annotation: Option<String>) -> Self {
        Self {
            parameters,
            return_annotation,
        }
    }

    /// Parse a function header such as `name(a: int, b=1) -> bool`
    ///
    /// A leading `def` and a trailing `:` are optional.
    pub fn parse(header: &str) -> ScriptResult<Self> {
        let header = header.trim();
        let mut source = if header.starts_with("def ") {
            header.to_string()
        } else {
            format!("def {header}")
        };
        source.push_str(if source.ends_with(':') { " pass" } else { ": pass" });
        ScriptChecker
            .find_definition(&source)
            .map(|definition| definition.signature)
    }

    /// Declared parameters in order
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Find a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Return annotation text, if any
    pub fn return_annotation(&self) -> Option<&str> {
        self.return_annotation.as_deref()
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Check whether there are no parameters
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(self.parameters.len() + 2);
        let mut previous: Option<ParameterKind> = None;
        for parameter in &self.parameters {
            if previous == Some(ParameterKind::PositionalOnly)
                && parameter.kind != ParameterKind::PositionalOnly
            {
                parts.push("/".to_string());
            }
            if parameter.kind == ParameterKind::KeywordOnly
                && !matches!(
                    previous,
                    Some(ParameterKind::KeywordOnly | ParameterKind::VarPositional)
                )
            {
                parts.push("*".to_string());
            }
            parts.push(parameter.to_string());
            previous = Some(parameter.kind);
        }
        if previous == Some(ParameterKind::PositionalOnly) {
            parts.push("/".to_string());
        }
        write!(f, "({})", parts.join(", "))?;
        if let Some(annotation) = &self.return_annotation {
            write!(f, " -> {annotation}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_header_variants() {
        let with_def = Signature::parse("def check(value: int, limit=10) -> bool:").unwrap();
        let bare = Signature::parse("check(value: int, limit=10) -> bool").unwrap();
        assert_eq!(with_def, bare);
        assert_eq!(bare.len(), 2);
        assert_eq!(bare.return_annotation(), Some("bool"));
        assert_eq!(bare.parameter("limit").unwrap().default.as_deref(), Some("10"));
    }

    #[test]
    fn display_marks_kinds() {
        let signature = Signature::parse("f(a, /, b: int = 1, *, c, **kw) -> None").unwrap();
        assert_eq!(signature.to_string(), "(a, /, b: int = 1, *, c, **kw) -> None");
        let signature = Signature::parse("g(*args, key=None)").unwrap();
        assert_eq!(signature.to_string(), "(*args, key=None)");
        assert_eq!(
            signature.parameter("key").unwrap().kind,
            ParameterKind::KeywordOnly
        );
    }
}
