//! Lexer for snippet source text
//!
//! Converts source into tokens, tracking indentation of logical lines and
//! emitting `Indent`/`Dedent` tokens. Newlines inside brackets and after a
//! backslash continuation do not end a logical line.

use crate::error::{ScriptError, ScriptResult};
use crate::span::Span;
use crate::token::{Keyword, Token, TokenKind};

const TAB_SIZE: usize = 8;

/// Lexer for snippet source text
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    indents: Vec<usize>,
    brackets: Vec<(char, usize)>,
    at_line_start: bool,
    tokens: Vec<Token<'a>>,
}

enum LineStart {
    Content,
    Blank,
    Eof,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer from an input string
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            indents: vec![0],
            brackets: Vec::new(),
            at_line_start: true,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(mut self) -> ScriptResult<Vec<Token<'a>>> {
        loop {
            if self.at_line_start && self.brackets.is_empty() {
                match self.read_indentation()? {
                    LineStart::Blank => continue,
                    LineStart::Eof => break,
                    LineStart::Content => {}
                }
            }

            self.skip_whitespace()?;
            let start = self.position;
            let Some(ch) = self.current_char() else {
                break;
            };

            if ch == '\n' {
                self.advance();
                self.push(TokenKind::Newline, start);
                self.at_line_start = true;
                continue;
            }

            let token = self.next_token(ch, start)?;
            self.tokens.push(token);
        }

        if let Some(&(open, offset)) = self.brackets.last() {
            return Err(self.error_at(format!("'{open}' was never closed"), offset));
        }
        let end = self.input.len();
        if self
            .tokens
            .last()
            .is_some_and(|token| token.kind != TokenKind::Newline)
        {
            self.tokens
                .push(Token::new(TokenKind::Newline, Span::at(end)));
        }
        for _ in 1..self.indents.len() {
            self.tokens.push(Token::new(TokenKind::Dedent, Span::at(end)));
        }
        self.tokens.push(Token::new(TokenKind::Eof, Span::at(end)));
        Ok(self.tokens)
    }

    fn next_token(&mut self, ch: char, start: usize) -> ScriptResult<Token<'a>> {
        if ch == '"' || ch == '\'' {
            return self.read_string(start);
        }
        if ch.is_ascii_digit() || (ch == '.' && self.peek().is_some_and(|c| c.is_ascii_digit())) {
            return self.read_number(start);
        }
        if ch.is_alphabetic() || ch == '_' {
            return self.read_identifier_or_keyword(start);
        }

        let kind = match ch {
            '(' | '[' | '{' => {
                self.brackets.push((ch, start));
                self.advance();
                match ch {
                    '(' => TokenKind::LeftParen,
                    '[' => TokenKind::LeftBracket,
                    _ => TokenKind::LeftBrace,
                }
            }
            ')' | ']' | '}' => {
                let expected = match ch {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match self.brackets.pop() {
                    Some((open, _)) if open == expected => {}
                    Some((open, _)) => {
                        return Err(self.error_at(
                            format!(
                                "closing parenthesis '{ch}' does not match opening parenthesis '{open}'"
                            ),
                            start,
                        ));
                    }
                    None => return Err(self.error_at(format!("unmatched '{ch}'"), start)),
                }
                self.advance();
                match ch {
                    ')' => TokenKind::RightParen,
                    ']' => TokenKind::RightBracket,
                    _ => TokenKind::RightBrace,
                }
            }
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            '~' => self.single(TokenKind::Tilde),
            '.' if self.rest().starts_with("...") => self.operator(3, TokenKind::Ellipsis),
            '.' => self.single(TokenKind::Dot),
            ':' if self.peek() == Some('=') => self.operator(2, TokenKind::Walrus),
            ':' => self.single(TokenKind::Colon),
            '-' if self.peek() == Some('>') => self.operator(2, TokenKind::Arrow),
            '=' if self.peek() == Some('=') => self.operator(2, TokenKind::Equal),
            '=' => self.single(TokenKind::Assign),
            '!' if self.peek() == Some('=') => self.operator(2, TokenKind::NotEqual),
            '<' if self.peek() == Some('>') => {
                return Err(self.error_at("invalid syntax", start));
            }
            _ => self.read_operator(ch, start)?,
        };
        Ok(Token::new(kind, Span::new(start, self.position)))
    }

    fn read_operator(&mut self, ch: char, start: usize) -> ScriptResult<TokenKind<'a>> {
        const AUGMENTED: &[&str] = &[
            "**=", "//=", ">>=", "<<=", "+=", "-=", "*=", "/=", "%=", "@=", "&=", "|=", "^=",
        ];
        if let Some(op) = AUGMENTED.iter().find(|op| self.rest().starts_with(**op)) {
            let len = op.len();
            let text = &self.input[start..start + len];
            return Ok(self.operator(len, TokenKind::AugAssign(text)));
        }

        let two = self.rest().get(..2).unwrap_or("");
        let kind = match two {
            "**" => self.operator(2, TokenKind::DoubleStar),
            "//" => self.operator(2, TokenKind::DoubleSlash),
            "<<" => self.operator(2, TokenKind::LeftShift),
            ">>" => self.operator(2, TokenKind::RightShift),
            "<=" => self.operator(2, TokenKind::LessEqual),
            ">=" => self.operator(2, TokenKind::GreaterEqual),
            _ => match ch {
                '+' => self.single(TokenKind::Plus),
                '-' => self.single(TokenKind::Minus),
                '*' => self.single(TokenKind::Star),
                '/' => self.single(TokenKind::Slash),
                '%' => self.single(TokenKind::Percent),
                '@' => self.single(TokenKind::At),
                '&' => self.single(TokenKind::Ampersand),
                '|' => self.single(TokenKind::Pipe),
                '^' => self.single(TokenKind::Caret),
                '<' => self.single(TokenKind::Less),
                '>' => self.single(TokenKind::Greater),
                _ => {
                    return Err(self.error_at(
                        format!("invalid character '{ch}' (U+{:04X})", ch as u32),
                        start,
                    ));
                }
            },
        };
        Ok(kind)
    }

    /// Measure indentation at the start of a physical line
    fn read_indentation(&mut self) -> ScriptResult<LineStart> {
        let mut column = 0;
        while let Some(ch) = self.current_char() {
            match ch {
                ' ' => column += 1,
                '\t' => column = (column / TAB_SIZE + 1) * TAB_SIZE,
                '\x0c' => column = 0,
                _ => break,
            }
            self.advance();
        }

        match self.current_char() {
            None => return Ok(LineStart::Eof),
            Some('\n' | '\r' | '#') => {
                while let Some(ch) = self.current_char() {
                    self.advance();
                    if ch == '\n' {
                        break;
                    }
                }
                return Ok(LineStart::Blank);
            }
            Some(_) => {}
        }

        let start = self.position;
        let current = self.indents.last().copied().unwrap_or(0);
        if column > current {
            self.indents.push(column);
            self.tokens
                .push(Token::new(TokenKind::Indent, Span::at(start)));
        } else if column < current {
            while self.indents.last().is_some_and(|&level| level > column) {
                self.indents.pop();
                self.tokens
                    .push(Token::new(TokenKind::Dedent, Span::at(start)));
            }
            if self.indents.last().copied().unwrap_or(0) != column {
                return Err(self.error_at(
                    "unindent does not match any outer indentation level",
                    start,
                ));
            }
        }
        self.at_line_start = false;
        Ok(LineStart::Content)
    }

    /// Skip whitespace, comments and line continuations
    fn skip_whitespace(&mut self) -> ScriptResult<()> {
        while let Some(ch) = self.current_char() {
            match ch {
                ' ' | '\t' | '\x0c' | '\r' => self.advance(),
                '\n' if !self.brackets.is_empty() => self.advance(),
                '#' => {
                    while self.current_char().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                '\\' => {
                    let after = self.rest()[1..].trim_start_matches('\r');
                    if after.starts_with('\n') {
                        self.position = self.input.len() - after.len() + 1;
                    } else {
                        return Err(self.error_at(
                            "unexpected character after line continuation character",
                            self.position,
                        ));
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn read_string(&mut self, start: usize) -> ScriptResult<Token<'a>> {
        let Some(quote) = self.current_char() else {
            return Err(self.error_at("unterminated string literal", start));
        };
        let triple: String = std::iter::repeat_n(quote, 3).collect();
        if self.rest().starts_with(&triple) {
            self.position += 3;
            loop {
                if self.rest().starts_with(&triple) {
                    self.position += 3;
                    break;
                }
                match self.current_char() {
                    None => {
                        return Err(
                            self.error_at("unterminated triple-quoted string literal", start)
                        );
                    }
                    Some('\\') => {
                        self.advance();
                        self.advance();
                    }
                    Some(_) => self.advance(),
                }
            }
        } else {
            self.advance();
            loop {
                match self.current_char() {
                    None | Some('\n') => {
                        return Err(self.error_at("unterminated string literal", start));
                    }
                    Some('\\') => {
                        self.advance();
                        self.advance();
                    }
                    Some(ch) if ch == quote => {
                        self.advance();
                        break;
                    }
                    Some(_) => self.advance(),
                }
            }
        }
        Ok(Token::new(
            TokenKind::String(&self.input[start..self.position]),
            Span::new(start, self.position),
        ))
    }

    fn read_number(&mut self, start: usize) -> ScriptResult<Token<'a>> {
        let radix_prefix = self
            .rest()
            .get(..2)
            .map(str::to_ascii_lowercase)
            .filter(|prefix| matches!(prefix.as_str(), "0x" | "0o" | "0b"));

        let mut is_plain_integer = false;
        if let Some(prefix) = radix_prefix {
            self.position += 2;
            let radix = match prefix.as_str() {
                "0x" => 16,
                "0o" => 8,
                _ => 2,
            };
            let digits_start = self.position;
            while self
                .current_char()
                .is_some_and(|c| c == '_' || c.is_digit(radix))
            {
                self.advance();
            }
            if self.position == digits_start {
                return Err(self.error_at("invalid numeric literal", start));
            }
        } else {
            self.read_digits();
            is_plain_integer = true;
            if self.current_char() == Some('.') {
                is_plain_integer = false;
                self.advance();
                self.read_digits();
            }
            if matches!(self.current_char(), Some('e' | 'E')) {
                is_plain_integer = false;
                self.advance();
                if matches!(self.current_char(), Some('+' | '-')) {
                    self.advance();
                }
                if !self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                    return Err(self.error_at("invalid decimal literal", start));
                }
                self.read_digits();
            }
            if matches!(self.current_char(), Some('j' | 'J')) {
                self.advance();
            }
        }

        if self
            .current_char()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            return Err(self.error_at("invalid decimal literal", start));
        }

        let text = &self.input[start..self.position];
        if is_plain_integer
            && text.len() > 1
            && text.starts_with('0')
            && text.chars().any(|c| c.is_ascii_digit() && c != '0')
        {
            return Err(self.error_at(
                "leading zeros in decimal integer literals are not permitted",
                start,
            ));
        }
        Ok(Token::new(
            TokenKind::Number(text),
            Span::new(start, self.position),
        ))
    }

    fn read_digits(&mut self) {
        while self
            .current_char()
            .is_some_and(|c| c.is_ascii_digit() || c == '_')
        {
            self.advance();
        }
    }

    fn read_identifier_or_keyword(&mut self, start: usize) -> ScriptResult<Token<'a>> {
        while self
            .current_char()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.advance();
        }
        let word = &self.input[start..self.position];

        let is_string_prefix = word.len() <= 2
            && word.chars().all(|c| "rRbBuUfF".contains(c))
            && matches!(self.current_char(), Some('"' | '\''));
        if is_string_prefix {
            let token = self.read_string(self.position)?;
            return Ok(Token::new(
                TokenKind::String(&self.input[start..token.span.end]),
                Span::new(start, token.span.end),
            ));
        }

        let kind = match Keyword::lookup(word) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Name(word),
        };
        Ok(Token::new(kind, Span::new(start, self.position)))
    }

    fn push(&mut self, kind: TokenKind<'a>, start: usize) {
        self.tokens
            .push(Token::new(kind, Span::new(start, self.position)));
    }

    fn single(&mut self, kind: TokenKind<'a>) -> TokenKind<'a> {
        self.advance();
        kind
    }

    fn operator(&mut self, len: usize, kind: TokenKind<'a>) -> TokenKind<'a> {
        self.position += len;
        kind
    }

    fn error_at(&self, message: impl Into<String>, offset: usize) -> ScriptError {
        let (line, column) = Span::at(offset).line_col(self.input);
        ScriptError::syntax(message, line, column)
    }

    fn rest(&self) -> &'a str {
        self.input.get(self.position..).unwrap_or("")
    }

    fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn simple_expression() {
        assert_eq!(
            kinds("a + 1"),
            vec![
                TokenKind::Name("a"),
                TokenKind::Plus,
                TokenKind::Number("1"),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn indentation_tokens() {
        let tokens = kinds("if x:\n    y = 1\n\n    # note\nz = 2\n");
        assert!(tokens.contains(&TokenKind::Indent));
        let dedent = tokens.iter().position(|k| *k == TokenKind::Dedent).unwrap();
        assert_eq!(tokens[dedent + 1], TokenKind::Name("z"));
    }

    #[test]
    fn newlines_inside_brackets_are_ignored() {
        let tokens = kinds("f(a,\n  b)\n");
        assert_eq!(
            tokens.iter().filter(|k| **k == TokenKind::Newline).count(),
            1
        );
        assert!(!tokens.contains(&TokenKind::Indent));
    }

    #[test]
    fn strings_and_prefixes() {
        let tokens = kinds("rb'x\\'' + \"\"\"a\nb\"\"\" + f\"{v}\"");
        assert_eq!(tokens[0], TokenKind::String("rb'x\\''"));
        assert_eq!(tokens[2], TokenKind::String("\"\"\"a\nb\"\"\""));
        assert_eq!(tokens[4], TokenKind::String("f\"{v}\""));
    }

    #[test]
    fn numbers() {
        let tokens = kinds("0x_ff 1_000 3.14e-2 .5 2j");
        assert_eq!(tokens[0], TokenKind::Number("0x_ff"));
        assert_eq!(tokens[1], TokenKind::Number("1_000"));
        assert_eq!(tokens[2], TokenKind::Number("3.14e-2"));
        assert_eq!(tokens[3], TokenKind::Number(".5"));
        assert_eq!(tokens[4], TokenKind::Number("2j"));
    }

    #[test]
    fn lexical_errors() {
        for source in ["'open", "(a", "a)", "x = 1$", "if x:\n    a\n  b\n", "012", "1abc"] {
            assert!(Lexer::new(source).tokenize().is_err(), "{source:?} should fail");
        }
    }
}
