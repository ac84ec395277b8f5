//! Recursive descent checker for snippet syntax
//!
//! The parser does not build a tree. Each expression rule returns a
//! [`Shape`] describing just enough about the parsed expression to validate
//! assignment targets. Top-level function and class definitions are
//! recorded with their parameter lists.

use crate::error::{ScriptError, ScriptResult};
use crate::lexer::Lexer;
use crate::signature::{Parameter, ParameterKind};
use crate::span::Span;
use crate::token::{Keyword, Token, TokenKind};

/// Assignment-relevant classification of an expression
#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Name,
    Attribute,
    Subscript,
    Starred(Box<Shape>),
    Sequence(Vec<Shape>),
    Call,
    Literal,
    Other,
}

impl Shape {
    fn target_error(&self, verb: &str) -> Option<String> {
        match self {
            Self::Name | Self::Attribute | Self::Subscript => None,
            Self::Starred(inner) => inner.target_error(verb),
            Self::Sequence(items) => items.iter().find_map(|item| item.target_error(verb)),
            Self::Call => Some(format!("cannot {verb} function call")),
            Self::Literal => Some(format!("cannot {verb} literal")),
            Self::Other => Some(format!("cannot {verb} expression")),
        }
    }

    fn is_single_target(&self) -> bool {
        matches!(self, Self::Name | Self::Attribute | Self::Subscript)
    }
}

enum Grouped {
    Single(Shape),
    Tuple(Vec<Shape>),
    Comprehension,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ParamContext {
    Def,
    Lambda,
}

/// A definition found at the top level of a module
#[derive(Debug, Clone)]
pub(crate) struct ParsedDefinition {
    pub name: String,
    pub is_class: bool,
    pub parameters: Vec<Parameter>,
    pub return_annotation: Option<String>,
    pub init_parameters: Option<Vec<Parameter>>,
}

/// Check that `source` is a single expression (or bare tuple of expressions)
pub(crate) fn parse_expression(source: &str) -> ScriptResult<()> {
    let mut tokens = Lexer::new(source).tokenize()?;
    if tokens.first().is_some_and(|t| t.kind == TokenKind::Indent) {
        tokens.remove(0);
        if let Some(index) = tokens.iter().rposition(|t| t.kind == TokenKind::Dedent) {
            tokens.remove(index);
        }
    }
    let mut parser = Parser::new(source, tokens);
    let shape = parser.testlist_star_expr()?;
    if matches!(shape, Shape::Starred(_)) {
        return Err(parser.error_here("can't use starred expression here"));
    }
    while parser.eat(&TokenKind::Newline) {}
    if !parser.at(&TokenKind::Eof) {
        return Err(parser.unexpected());
    }
    Ok(())
}

/// Check that `source` is a valid sequence of statements
pub(crate) fn parse_module(source: &str) -> ScriptResult<Vec<ParsedDefinition>> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(source, tokens);
    while !parser.at(&TokenKind::Eof) {
        if parser.eat(&TokenKind::Newline) {
            continue;
        }
        parser.statement()?;
    }
    Ok(parser.definitions)
}

/// Parser over the token stream of one snippet
struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    position: usize,
    function_depth: usize,
    loop_depth: usize,
    block_depth: usize,
    class_body: Option<(usize, usize)>,
    definitions: Vec<ParsedDefinition>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: Vec<Token<'a>>) -> Self {
        Self {
            source,
            tokens,
            position: 0,
            function_depth: 0,
            loop_depth: 0,
            block_depth: 0,
            class_body: None,
            definitions: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn statement(&mut self) -> ScriptResult<()> {
        match self.kind() {
            TokenKind::Keyword(Keyword::If) => self.if_statement(),
            TokenKind::Keyword(Keyword::While) => self.while_statement(),
            TokenKind::Keyword(Keyword::For) => self.for_statement(),
            TokenKind::Keyword(Keyword::Try) => self.try_statement(),
            TokenKind::Keyword(Keyword::With) => self.with_statement(),
            TokenKind::Keyword(Keyword::Def) => self.function_definition(false),
            TokenKind::Keyword(Keyword::Class) => self.class_definition(),
            TokenKind::At => self.decorated(),
            TokenKind::Keyword(Keyword::Async) => {
                self.advance();
                match self.kind() {
                    TokenKind::Keyword(Keyword::Def) => self.function_definition(true),
                    TokenKind::Keyword(Keyword::For) => self.for_statement(),
                    TokenKind::Keyword(Keyword::With) => self.with_statement(),
                    _ => Err(self.unexpected()),
                }
            }
            _ => self.simple_statements(),
        }
    }

    fn simple_statements(&mut self) -> ScriptResult<()> {
        self.small_statement()?;
        while self.eat(&TokenKind::Semicolon) {
            if self.at(&TokenKind::Newline) || self.at(&TokenKind::Eof) {
                break;
            }
            self.small_statement()?;
        }
        if self.eat(&TokenKind::Newline) || self.at(&TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn small_statement(&mut self) -> ScriptResult<()> {
        match self.kind() {
            TokenKind::Keyword(Keyword::Pass) => self.advance(),
            TokenKind::Keyword(Keyword::Break) => {
                if self.loop_depth == 0 {
                    return Err(self.error_here("'break' outside loop"));
                }
                self.advance();
            }
            TokenKind::Keyword(Keyword::Continue) => {
                if self.loop_depth == 0 {
                    return Err(self.error_here("'continue' not properly in loop"));
                }
                self.advance();
            }
            TokenKind::Keyword(Keyword::Return) => {
                if self.function_depth == 0 {
                    return Err(self.error_here("'return' outside function"));
                }
                self.advance();
                if self.starts_expression() {
                    self.testlist_star_expr()?;
                }
            }
            TokenKind::Keyword(Keyword::Raise) => {
                self.advance();
                if self.starts_expression() {
                    self.test()?;
                    if self.eat_keyword(Keyword::From) {
                        self.test()?;
                    }
                }
            }
            TokenKind::Keyword(Keyword::Global) => {
                self.advance();
                self.name_list()?;
            }
            TokenKind::Keyword(Keyword::Nonlocal) => {
                if self.function_depth == 0 {
                    return Err(self.error_here("nonlocal declaration not allowed at module level"));
                }
                self.advance();
                self.name_list()?;
            }
            TokenKind::Keyword(Keyword::Del) => {
                self.advance();
                let start = self.position;
                let targets = self.testlist_star_expr()?;
                if let Some(message) = targets.target_error("delete") {
                    return Err(self.error_at_token(start, message));
                }
            }
            TokenKind::Keyword(Keyword::Assert) => {
                self.advance();
                self.test()?;
                if self.eat(&TokenKind::Comma) {
                    self.test()?;
                }
            }
            TokenKind::Keyword(Keyword::Import) => {
                self.advance();
                self.dotted_as_name()?;
                while self.eat(&TokenKind::Comma) {
                    self.dotted_as_name()?;
                }
            }
            TokenKind::Keyword(Keyword::From) => self.import_from()?,
            TokenKind::Keyword(Keyword::Yield) => {
                self.yield_expr()?;
            }
            _ => self.expression_statement()?,
        }
        Ok(())
    }

    fn expression_statement(&mut self) -> ScriptResult<()> {
        let start = self.position;
        let target = self.testlist_star_expr()?;
        match self.kind() {
            TokenKind::AugAssign(_) => {
                if !target.is_single_target() {
                    return Err(self.error_at_token(
                        start,
                        "illegal expression for augmented assignment",
                    ));
                }
                self.advance();
                self.yield_or_testlist()?;
            }
            TokenKind::Colon => {
                if !target.is_single_target() {
                    return Err(self.error_at_token(start, "illegal target for annotation"));
                }
                self.advance();
                self.test()?;
                if self.eat(&TokenKind::Assign) {
                    self.yield_or_testlist()?;
                }
            }
            TokenKind::Assign => {
                let mut target = target;
                let mut target_start = start;
                while self.at(&TokenKind::Assign) {
                    if matches!(target, Shape::Starred(_)) {
                        return Err(self.error_at_token(
                            target_start,
                            "starred assignment target must be in a list or tuple",
                        ));
                    }
                    if let Some(message) = target.target_error("assign to") {
                        return Err(self.error_at_token(target_start, message));
                    }
                    self.advance();
                    target_start = self.position;
                    target = self.yield_or_testlist()?;
                }
            }
            _ => {
                if matches!(target, Shape::Starred(_)) {
                    return Err(self.error_at_token(start, "can't use starred expression here"));
                }
            }
        }
        Ok(())
    }

    fn yield_or_testlist(&mut self) -> ScriptResult<Shape> {
        if self.at_keyword(Keyword::Yield) {
            self.yield_expr()
        } else {
            self.testlist_star_expr()
        }
    }

    fn yield_expr(&mut self) -> ScriptResult<Shape> {
        if self.function_depth == 0 {
            return Err(self.error_here("'yield' outside function"));
        }
        self.advance();
        if self.eat_keyword(Keyword::From) {
            self.test()?;
        } else if self.starts_expression() {
            self.testlist_star_expr()?;
        }
        Ok(Shape::Other)
    }

    fn name_list(&mut self) -> ScriptResult<()> {
        self.expect_name()?;
        while self.eat(&TokenKind::Comma) {
            self.expect_name()?;
        }
        Ok(())
    }

    fn dotted_name(&mut self) -> ScriptResult<()> {
        self.expect_name()?;
        while self.eat(&TokenKind::Dot) {
            self.expect_name()?;
        }
        Ok(())
    }

    fn dotted_as_name(&mut self) -> ScriptResult<()> {
        self.dotted_name()?;
        if self.eat_keyword(Keyword::As) {
            self.expect_name()?;
        }
        Ok(())
    }

    fn import_from(&mut self) -> ScriptResult<()> {
        self.advance();
        let mut dots = 0;
        while self.eat(&TokenKind::Dot) || self.eat(&TokenKind::Ellipsis) {
            dots += 1;
        }
        if matches!(self.kind(), TokenKind::Name(_)) {
            self.dotted_name()?;
        } else if dots == 0 {
            return Err(self.unexpected());
        }
        self.expect(&TokenKind::Keyword(Keyword::Import))?;
        if self.eat(&TokenKind::Star) {
            return Ok(());
        }
        let parenthesized = self.eat(&TokenKind::LeftParen);
        loop {
            self.expect_name()?;
            if self.eat_keyword(Keyword::As) {
                self.expect_name()?;
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            if parenthesized && self.at(&TokenKind::RightParen) {
                break;
            }
            if !parenthesized && !matches!(self.kind(), TokenKind::Name(_)) {
                return Err(self.error_here("trailing comma not allowed without surrounding parentheses"));
            }
        }
        if parenthesized {
            self.expect(&TokenKind::RightParen)?;
        }
        Ok(())
    }

    fn suite(&mut self) -> ScriptResult<()> {
        self.block_depth += 1;
        if self.eat(&TokenKind::Newline) {
            if !self.eat(&TokenKind::Indent) {
                return Err(self.error_here("expected an indented block"));
            }
            while !self.at(&TokenKind::Dedent) && !self.at(&TokenKind::Eof) {
                if self.eat(&TokenKind::Newline) {
                    continue;
                }
                self.statement()?;
            }
            self.eat(&TokenKind::Dedent);
        } else {
            self.simple_statements()?;
        }
        self.block_depth -= 1;
        Ok(())
    }

    fn block(&mut self) -> ScriptResult<()> {
        self.expect(&TokenKind::Colon)?;
        self.suite()
    }

    fn loop_body(&mut self) -> ScriptResult<()> {
        self.loop_depth += 1;
        let result = self.block();
        self.loop_depth -= 1;
        result?;
        if self.eat_keyword(Keyword::Else) {
            self.block()?;
        }
        Ok(())
    }

    fn if_statement(&mut self) -> ScriptResult<()> {
        self.advance();
        self.namedexpr_test()?;
        self.block()?;
        while self.eat_keyword(Keyword::Elif) {
            self.namedexpr_test()?;
            self.block()?;
        }
        if self.eat_keyword(Keyword::Else) {
            self.block()?;
        }
        Ok(())
    }

    fn while_statement(&mut self) -> ScriptResult<()> {
        self.advance();
        self.namedexpr_test()?;
        self.loop_body()
    }

    fn for_statement(&mut self) -> ScriptResult<()> {
        self.advance();
        let start = self.position;
        let targets = self.exprlist()?;
        if let Some(message) = targets.target_error("assign to") {
            return Err(self.error_at_token(start, message));
        }
        self.expect(&TokenKind::Keyword(Keyword::In))?;
        self.testlist_star_expr()?;
        self.loop_body()
    }

    fn try_statement(&mut self) -> ScriptResult<()> {
        self.advance();
        self.block()?;
        let mut has_handler = false;
        while self.eat_keyword(Keyword::Except) {
            if !self.at(&TokenKind::Colon) {
                self.eat(&TokenKind::Star);
                self.test()?;
                if self.eat_keyword(Keyword::As) {
                    self.expect_name()?;
                }
            }
            self.block()?;
            has_handler = true;
        }
        if has_handler && self.eat_keyword(Keyword::Else) {
            self.block()?;
        }
        if self.eat_keyword(Keyword::Finally) {
            self.block()?;
            has_handler = true;
        }
        if has_handler {
            Ok(())
        } else {
            Err(self.error_here("expected 'except' or 'finally' block"))
        }
    }

    fn with_statement(&mut self) -> ScriptResult<()> {
        self.advance();
        loop {
            self.test()?;
            if self.eat_keyword(Keyword::As) {
                let start = self.position;
                let target = self.binary(0)?;
                if let Some(message) = target.target_error("assign to") {
                    return Err(self.error_at_token(start, message));
                }
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.block()
    }

    fn decorated(&mut self) -> ScriptResult<()> {
        while self.eat(&TokenKind::At) {
            self.namedexpr_test()?;
            self.expect(&TokenKind::Newline)?;
        }
        match self.kind() {
            TokenKind::Keyword(Keyword::Def) => self.function_definition(false),
            TokenKind::Keyword(Keyword::Class) => self.class_definition(),
            TokenKind::Keyword(Keyword::Async) => {
                self.advance();
                if self.at_keyword(Keyword::Def) {
                    self.function_definition(true)
                } else {
                    Err(self.unexpected())
                }
            }
            _ => Err(self.unexpected()),
        }
    }

    fn function_definition(&mut self, is_async: bool) -> ScriptResult<()> {
        self.advance();
        let name = self.expect_name()?.to_string();
        self.expect(&TokenKind::LeftParen)?;
        let parameters = self.parameter_list(ParamContext::Def)?;
        self.expect(&TokenKind::RightParen)?;
        let return_annotation = if self.eat(&TokenKind::Arrow) {
            Some(self.capture(Self::test)?)
        } else {
            None
        };
        self.expect(&TokenKind::Colon)?;

        if let Some((index, depth)) = self.class_body
            && depth == self.block_depth
            && name == "__init__"
            && let Some(definition) = self.definitions.get_mut(index)
        {
            definition.init_parameters = Some(parameters.clone());
        }
        if self.block_depth == 0 && !is_async {
            self.definitions.push(ParsedDefinition {
                name,
                is_class: false,
                parameters,
                return_annotation,
                init_parameters: None,
            });
        }

        let saved = (self.function_depth, self.loop_depth, self.class_body.take());
        self.function_depth += 1;
        self.loop_depth = 0;
        let result = self.suite();
        (self.function_depth, self.loop_depth, self.class_body) = saved;
        result
    }

    fn class_definition(&mut self) -> ScriptResult<()> {
        self.advance();
        let name = self.expect_name()?.to_string();
        if self.at(&TokenKind::LeftParen) {
            self.arguments()?;
        }
        self.expect(&TokenKind::Colon)?;

        let record = if self.block_depth == 0 {
            self.definitions.push(ParsedDefinition {
                name,
                is_class: true,
                parameters: Vec::new(),
                return_annotation: None,
                init_parameters: None,
            });
            Some(self.definitions.len() - 1)
        } else {
            None
        };

        let saved = (self.function_depth, self.loop_depth, self.class_body);
        self.function_depth = 0;
        self.loop_depth = 0;
        self.class_body = record.map(|index| (index, self.block_depth + 1));
        let result = self.suite();
        (self.function_depth, self.loop_depth, self.class_body) = saved;
        result
    }

    fn parameter_list(&mut self, context: ParamContext) -> ScriptResult<Vec<Parameter>> {
        let close = match context {
            ParamContext::Def => TokenKind::RightParen,
            ParamContext::Lambda => TokenKind::Colon,
        };
        let mut parameters: Vec<Parameter> = Vec::new();
        let mut kind = ParameterKind::PositionalOrKeyword;
        let mut seen_slash = false;
        let mut seen_default = false;
        let mut bare_star = false;
        let mut seen_var_keyword = false;

        while !self.at(&close) {
            if seen_var_keyword {
                return Err(self.error_here("arguments cannot follow var-keyword argument"));
            }
            let start = self.position;
            let parameter = if self.eat(&TokenKind::Slash) {
                if seen_slash {
                    return Err(self.error_at_token(start, "/ may appear only once"));
                }
                if kind != ParameterKind::PositionalOrKeyword {
                    return Err(self.error_at_token(start, "/ must be ahead of *"));
                }
                if parameters.is_empty() {
                    return Err(self.error_at_token(start, "at least one argument must precede /"));
                }
                for parameter in &mut parameters {
                    parameter.kind = ParameterKind::PositionalOnly;
                }
                seen_slash = true;
                None
            } else if self.eat(&TokenKind::Star) {
                if kind == ParameterKind::KeywordOnly {
                    return Err(self.error_at_token(start, "* argument may appear only once"));
                }
                kind = ParameterKind::KeywordOnly;
                if matches!(self.kind(), TokenKind::Name(_)) {
                    Some(self.parameter(ParameterKind::VarPositional, context, false)?)
                } else {
                    bare_star = true;
                    None
                }
            } else if self.eat(&TokenKind::DoubleStar) {
                seen_var_keyword = true;
                Some(self.parameter(ParameterKind::VarKeyword, context, false)?)
            } else {
                let parameter = self.parameter(kind, context, true)?;
                if kind == ParameterKind::PositionalOrKeyword {
                    if parameter.default.is_some() {
                        seen_default = true;
                    } else if seen_default {
                        return Err(self.error_at_token(
                            start,
                            "non-default argument follows default argument",
                        ));
                    }
                }
                bare_star = false;
                Some(parameter)
            };

            if let Some(parameter) = parameter {
                if parameters.iter().any(|p| p.name == parameter.name) {
                    return Err(self.error_at_token(
                        start,
                        format!(
                            "duplicate argument '{}' in function definition",
                            parameter.name
                        ),
                    ));
                }
                parameters.push(parameter);
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        if bare_star {
            return Err(self.error_here("named arguments must follow bare *"));
        }
        Ok(parameters)
    }

    fn parameter(
        &mut self,
        kind: ParameterKind,
        context: ParamContext,
        allow_default: bool,
    ) -> ScriptResult<Parameter> {
        let mut parameter = Parameter::new(self.expect_name()?, kind);
        if context == ParamContext::Def && self.eat(&TokenKind::Colon) {
            parameter.annotation = Some(self.capture(Self::test)?);
        }
        if allow_default && self.eat(&TokenKind::Assign) {
            parameter.default = Some(self.capture(Self::test)?);
        }
        Ok(parameter)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn testlist_star_expr(&mut self) -> ScriptResult<Shape> {
        let first = self.star_or_test()?;
        if !self.at(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if !self.starts_expression() {
                break;
            }
            items.push(self.star_or_test()?);
        }
        Ok(Shape::Sequence(items))
    }

    fn exprlist(&mut self) -> ScriptResult<Shape> {
        let first = self.star_or_expr()?;
        if !self.at(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if !self.starts_expression() {
                break;
            }
            items.push(self.star_or_expr()?);
        }
        Ok(Shape::Sequence(items))
    }

    fn star_or_test(&mut self) -> ScriptResult<Shape> {
        if self.at(&TokenKind::Star) {
            self.star_expr()
        } else {
            self.test()
        }
    }

    fn star_or_expr(&mut self) -> ScriptResult<Shape> {
        if self.at(&TokenKind::Star) {
            self.star_expr()
        } else {
            self.binary(0)
        }
    }

    fn star_or_namedexpr(&mut self) -> ScriptResult<Shape> {
        if self.at(&TokenKind::Star) {
            self.star_expr()
        } else {
            self.namedexpr_test()
        }
    }

    fn star_expr(&mut self) -> ScriptResult<Shape> {
        self.advance();
        let inner = self.binary(0)?;
        Ok(Shape::Starred(Box::new(inner)))
    }

    fn namedexpr_test(&mut self) -> ScriptResult<Shape> {
        let start = self.position;
        let shape = self.test()?;
        if self.at(&TokenKind::Walrus) {
            if shape != Shape::Name {
                return Err(self.error_at_token(
                    start,
                    "cannot use assignment expressions with expression",
                ));
            }
            self.advance();
            self.test()?;
            return Ok(Shape::Other);
        }
        Ok(shape)
    }

    fn test(&mut self) -> ScriptResult<Shape> {
        if self.at_keyword(Keyword::Lambda) {
            return self.lambda();
        }
        let shape = self.or_test()?;
        if self.eat_keyword(Keyword::If) {
            self.or_test()?;
            if !self.eat_keyword(Keyword::Else) {
                return Err(self.error_here("expected 'else' after 'if' expression"));
            }
            self.test()?;
            return Ok(Shape::Other);
        }
        Ok(shape)
    }

    fn lambda(&mut self) -> ScriptResult<Shape> {
        self.advance();
        self.parameter_list(ParamContext::Lambda)?;
        self.expect(&TokenKind::Colon)?;
        self.test()?;
        Ok(Shape::Other)
    }

    fn or_test(&mut self) -> ScriptResult<Shape> {
        let mut shape = self.and_test()?;
        while self.eat_keyword(Keyword::Or) {
            self.and_test()?;
            shape = Shape::Other;
        }
        Ok(shape)
    }

    fn and_test(&mut self) -> ScriptResult<Shape> {
        let mut shape = self.not_test()?;
        while self.eat_keyword(Keyword::And) {
            self.not_test()?;
            shape = Shape::Other;
        }
        Ok(shape)
    }

    fn not_test(&mut self) -> ScriptResult<Shape> {
        if self.eat_keyword(Keyword::Not) {
            self.not_test()?;
            return Ok(Shape::Other);
        }
        self.comparison()
    }

    fn comparison(&mut self) -> ScriptResult<Shape> {
        let mut shape = self.binary(0)?;
        while self.kind().is_comparison() {
            match self.kind() {
                TokenKind::Keyword(Keyword::Not) => {
                    self.advance();
                    self.expect(&TokenKind::Keyword(Keyword::In))?;
                }
                TokenKind::Keyword(Keyword::Is) => {
                    self.advance();
                    self.eat_keyword(Keyword::Not);
                }
                _ => self.advance(),
            }
            self.binary(0)?;
            shape = Shape::Other;
        }
        Ok(shape)
    }

    /// Binary arithmetic and bitwise operators with precedence climbing
    fn binary(&mut self, min_precedence: u8) -> ScriptResult<Shape> {
        let mut left = self.unary()?;
        while let Some(precedence) = self.kind().binary_precedence() {
            if precedence < min_precedence {
                break;
            }
            self.advance();
            self.binary(precedence + 1)?;
            left = Shape::Other;
        }
        Ok(left)
    }

    fn unary(&mut self) -> ScriptResult<Shape> {
        if matches!(
            self.kind(),
            TokenKind::Plus | TokenKind::Minus | TokenKind::Tilde
        ) {
            self.advance();
            self.unary()?;
            return Ok(Shape::Other);
        }
        self.power()
    }

    fn power(&mut self) -> ScriptResult<Shape> {
        let awaited = self.eat_keyword(Keyword::Await);
        let shape = self.atom_with_trailers()?;
        if self.eat(&TokenKind::DoubleStar) {
            self.unary()?;
            return Ok(Shape::Other);
        }
        Ok(if awaited { Shape::Other } else { shape })
    }

    fn atom_with_trailers(&mut self) -> ScriptResult<Shape> {
        let mut shape = self.atom()?;
        loop {
            match self.kind() {
                TokenKind::LeftParen => {
                    self.arguments()?;
                    shape = Shape::Call;
                }
                TokenKind::LeftBracket => {
                    self.subscripts()?;
                    shape = Shape::Subscript;
                }
                TokenKind::Dot => {
                    self.advance();
                    self.expect_name()?;
                    shape = Shape::Attribute;
                }
                _ => return Ok(shape),
            }
        }
    }

    fn atom(&mut self) -> ScriptResult<Shape> {
        match self.kind() {
            TokenKind::Name(_) => {
                self.advance();
                Ok(Shape::Name)
            }
            TokenKind::Number(_)
            | TokenKind::Ellipsis
            | TokenKind::Keyword(Keyword::None | Keyword::True | Keyword::False) => {
                self.advance();
                Ok(Shape::Literal)
            }
            TokenKind::String(_) => {
                while matches!(self.kind(), TokenKind::String(_)) {
                    self.advance();
                }
                Ok(Shape::Literal)
            }
            TokenKind::LeftParen => {
                self.advance();
                if self.eat(&TokenKind::RightParen) {
                    return Ok(Shape::Sequence(Vec::new()));
                }
                if self.at_keyword(Keyword::Yield) {
                    self.yield_expr()?;
                    self.expect(&TokenKind::RightParen)?;
                    return Ok(Shape::Other);
                }
                let start = self.position;
                let grouped = self.testlist_comp(&TokenKind::RightParen)?;
                self.expect(&TokenKind::RightParen)?;
                match grouped {
                    Grouped::Single(Shape::Starred(_)) => {
                        Err(self.error_at_token(start, "cannot use starred expression here"))
                    }
                    Grouped::Single(shape) => Ok(shape),
                    Grouped::Tuple(items) => Ok(Shape::Sequence(items)),
                    Grouped::Comprehension => Ok(Shape::Other),
                }
            }
            TokenKind::LeftBracket => {
                self.advance();
                if self.eat(&TokenKind::RightBracket) {
                    return Ok(Shape::Sequence(Vec::new()));
                }
                let grouped = self.testlist_comp(&TokenKind::RightBracket)?;
                self.expect(&TokenKind::RightBracket)?;
                Ok(match grouped {
                    Grouped::Single(shape) => Shape::Sequence(vec![shape]),
                    Grouped::Tuple(items) => Shape::Sequence(items),
                    Grouped::Comprehension => Shape::Other,
                })
            }
            TokenKind::LeftBrace => {
                self.dict_or_set()?;
                Ok(Shape::Literal)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn testlist_comp(&mut self, close: &TokenKind<'_>) -> ScriptResult<Grouped> {
        let first = self.star_or_namedexpr()?;
        if self.at_comprehension() {
            self.comprehension()?;
            return Ok(Grouped::Comprehension);
        }
        if !self.at(&TokenKind::Comma) {
            return Ok(Grouped::Single(first));
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.at(close) {
                break;
            }
            items.push(self.star_or_namedexpr()?);
        }
        Ok(Grouped::Tuple(items))
    }

    fn at_comprehension(&self) -> bool {
        self.at_keyword(Keyword::For)
            || (self.at_keyword(Keyword::Async)
                && self
                    .tokens
                    .get(self.position + 1)
                    .is_some_and(|t| t.kind.is_keyword(Keyword::For)))
    }

    fn comprehension(&mut self) -> ScriptResult<()> {
        while self.at_comprehension() {
            self.eat_keyword(Keyword::Async);
            self.advance();
            let start = self.position;
            let targets = self.exprlist()?;
            if let Some(message) = targets.target_error("assign to") {
                return Err(self.error_at_token(start, message));
            }
            self.expect(&TokenKind::Keyword(Keyword::In))?;
            self.or_test()?;
            while self.eat_keyword(Keyword::If) {
                if self.at_keyword(Keyword::Lambda) {
                    self.lambda()?;
                } else {
                    self.or_test()?;
                }
            }
        }
        Ok(())
    }

    fn dict_or_set(&mut self) -> ScriptResult<()> {
        self.advance();
        if self.eat(&TokenKind::RightBrace) {
            return Ok(());
        }
        let is_dict = if self.eat(&TokenKind::DoubleStar) {
            self.binary(0)?;
            true
        } else {
            let first = self.star_or_test()?;
            if !matches!(first, Shape::Starred(_)) && self.eat(&TokenKind::Colon) {
                self.test()?;
                true
            } else {
                false
            }
        };
        if self.at_comprehension() {
            self.comprehension()?;
        } else {
            while self.eat(&TokenKind::Comma) {
                if self.at(&TokenKind::RightBrace) {
                    break;
                }
                if is_dict {
                    if self.eat(&TokenKind::DoubleStar) {
                        self.binary(0)?;
                    } else {
                        self.test()?;
                        self.expect(&TokenKind::Colon)?;
                        self.test()?;
                    }
                } else {
                    self.star_or_test()?;
                }
            }
        }
        self.expect(&TokenKind::RightBrace)
    }

    fn arguments(&mut self) -> ScriptResult<()> {
        self.advance();
        let mut seen_keyword = false;
        let mut seen_keyword_unpack = false;
        while !self.at(&TokenKind::RightParen) {
            let start = self.position;
            if self.eat(&TokenKind::Star) {
                if seen_keyword_unpack {
                    return Err(self.error_at_token(
                        start,
                        "iterable argument unpacking follows keyword argument unpacking",
                    ));
                }
                self.test()?;
            } else if self.eat(&TokenKind::DoubleStar) {
                self.test()?;
                seen_keyword_unpack = true;
            } else {
                let shape = self.test()?;
                if self.at(&TokenKind::Assign) {
                    if shape != Shape::Name {
                        return Err(self.error_at_token(
                            start,
                            "expression cannot contain assignment, perhaps you meant \"==\"?",
                        ));
                    }
                    self.advance();
                    self.test()?;
                    seen_keyword = true;
                } else if self.at(&TokenKind::Walrus) {
                    self.advance();
                    self.test()?;
                } else if self.at_comprehension() {
                    self.comprehension()?;
                } else if seen_keyword_unpack {
                    return Err(self.error_at_token(
                        start,
                        "positional argument follows keyword argument unpacking",
                    ));
                } else if seen_keyword {
                    return Err(
                        self.error_at_token(start, "positional argument follows keyword argument")
                    );
                }
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)
    }

    fn subscripts(&mut self) -> ScriptResult<()> {
        self.advance();
        loop {
            self.subscript()?;
            if !self.eat(&TokenKind::Comma) || self.at(&TokenKind::RightBracket) {
                break;
            }
        }
        self.expect(&TokenKind::RightBracket)
    }

    fn subscript(&mut self) -> ScriptResult<()> {
        if self.at(&TokenKind::Star) {
            self.star_expr()?;
            return Ok(());
        }
        if !self.at(&TokenKind::Colon) {
            self.namedexpr_test()?;
        }
        if self.eat(&TokenKind::Colon) {
            if !self.at_slice_end(true) {
                self.test()?;
            }
            if self.eat(&TokenKind::Colon) && !self.at_slice_end(false) {
                self.test()?;
            }
        }
        Ok(())
    }

    fn at_slice_end(&self, colon_ends: bool) -> bool {
        matches!(self.kind(), TokenKind::Comma | TokenKind::RightBracket)
            || (colon_ends && self.at(&TokenKind::Colon))
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn starts_expression(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Name(_)
                | TokenKind::Number(_)
                | TokenKind::String(_)
                | TokenKind::Ellipsis
                | TokenKind::LeftParen
                | TokenKind::LeftBracket
                | TokenKind::LeftBrace
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Tilde
                | TokenKind::Star
                | TokenKind::Keyword(
                    Keyword::None
                        | Keyword::True
                        | Keyword::False
                        | Keyword::Not
                        | Keyword::Lambda
                        | Keyword::Await
                )
        )
    }

    /// Run a rule and return the normalized text of the consumed tokens
    fn capture(&mut self, rule: fn(&mut Self) -> ScriptResult<Shape>) -> ScriptResult<String> {
        let start = self.position;
        rule(self)?;
        Ok(self.text_between(start, self.position))
    }

    fn text_between(&self, from: usize, to: usize) -> String {
        let is_wordy = |kind: &TokenKind<'_>| kind.is_word() || matches!(kind, TokenKind::String(_));
        let mut text = String::new();
        let mut previous: Option<&TokenKind<'_>> = None;
        for token in self.tokens.get(from..to).unwrap_or_default() {
            if previous.is_some_and(is_wordy) && is_wordy(&token.kind) {
                text.push(' ');
            }
            text.push_str(token.span.slice(self.source));
            previous = Some(&token.kind);
        }
        text
    }

    fn kind(&self) -> &TokenKind<'a> {
        self.tokens
            .get(self.position)
            .map_or(&TokenKind::Eof, |token| &token.kind)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn at(&self, kind: &TokenKind<'_>) -> bool {
        self.kind() == kind
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        self.kind().is_keyword(keyword)
    }

    fn eat(&mut self, kind: &TokenKind<'_>) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        self.eat(&TokenKind::Keyword(keyword))
    }

    fn expect(&mut self, kind: &TokenKind<'_>) -> ScriptResult<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_name(&mut self) -> ScriptResult<&'a str> {
        let name = match self.kind() {
            TokenKind::Name(name) => *name,
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(name)
    }

    fn unexpected(&self) -> ScriptError {
        let message = match self.kind() {
            TokenKind::Eof => "unexpected EOF while parsing",
            TokenKind::Indent => "unexpected indent",
            TokenKind::Dedent => "unexpected unindent",
            _ => "invalid syntax",
        };
        self.error_here(message)
    }

    fn error_here(&self, message: impl Into<String>) -> ScriptError {
        self.error_at_token(self.position, message)
    }

    fn error_at_token(&self, index: usize, message: impl Into<String>) -> ScriptError {
        let offset = self
            .tokens
            .get(index)
            .map_or(self.source.len(), |token| token.span.start);
        let (line, column) = Span::at(offset).line_col(self.source);
        ScriptError::syntax(message, line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a + b * 2")]
    #[case("x if y else z")]
    #[case("lambda a, b=1: a + b")]
    #[case("[i * i for i in range(10) if i % 2]")]
    #[case("{k: v for k, v in items}")]
    #[case("f(a, *rest, key=1, **extra)")]
    #[case("data['key'][1:2, ::3].attr")]
    #[case("not a and b or c")]
    #[case("a is not None and b not in c")]
    #[case("(1, 2,)")]
    #[case("-x ** 2 // 3")]
    #[case("  leading")]
    fn valid_expressions(#[case] source: &str) {
        parse_expression(source).unwrap();
    }

    #[rstest]
    #[case("a = 5")]
    #[case("a +")]
    #[case("")]
    #[case("f(x=1, 2)")]
    #[case("x if y")]
    #[case("a b")]
    #[case("yield x")]
    fn invalid_expressions(#[case] source: &str) {
        assert!(parse_expression(source).is_err(), "{source:?} should fail");
    }

    #[test]
    fn module_with_blocks() {
        let source = "\
import os
from . import sibling
total = 0
for i, item in enumerate(items):
    if item:
        total += i
    elif item is None:
        continue
    else:
        break
try:
    risky()
except (KeyError, ValueError) as err:
    pass
finally:
    cleanup()
with open(path) as handle, lock:
    data = handle.read()
";
        parse_module(source).unwrap();
    }

    #[rstest]
    #[case("return 1", "'return' outside function")]
    #[case("break", "'break' outside loop")]
    #[case("1 = x", "cannot assign to literal")]
    #[case("f() = x", "cannot assign to function call")]
    #[case("if x:\npass", "expected an indented block")]
    #[case("  x = 1", "unexpected indent")]
    #[case("try:\n    pass\n", "expected 'except' or 'finally' block")]
    #[case("def f(a=1, b):\n    pass", "non-default argument follows default argument")]
    #[case("def f(a, a):\n    pass", "duplicate argument 'a' in function definition")]
    #[case("def f(*):\n    pass", "named arguments must follow bare *")]
    fn invalid_modules(#[case] source: &str, #[case] message: &str) {
        let err = parse_module(source).unwrap_err();
        assert!(err.to_string().starts_with(message), "{err}");
    }

    #[test]
    fn records_top_level_definitions() {
        let source = "\
@decorator
def first(a: int, b: 'str' = 'x', *args, flag=False, **kw) -> bool:
    def nested(): pass
    return True

class Thing(Base):
    def __init__(self, value, scale=1.0):
        self.value = value
";
        let definitions = parse_module(source).unwrap();
        assert_eq!(definitions.len(), 2);
        let first = &definitions[0];
        assert_eq!(first.name, "first");
        assert_eq!(first.parameters.len(), 5);
        assert_eq!(first.parameters[1].annotation.as_deref(), Some("'str'"));
        assert_eq!(first.parameters[1].default.as_deref(), Some("'x'"));
        assert_eq!(first.parameters[3].kind, ParameterKind::KeywordOnly);
        assert_eq!(first.return_annotation.as_deref(), Some("bool"));
        let thing = &definitions[1];
        assert!(thing.is_class);
        assert_eq!(thing.init_parameters.as_ref().map(Vec::len), Some(3));
    }
}
