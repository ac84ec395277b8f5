//! Token types for the snippet lexer

use crate::span::Span;

/// A token with position information
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    /// The token kind
    pub kind: TokenKind<'a>,
    /// Source span for this token
    pub span: Span,
}

impl<'a> Token<'a> {
    /// Create a new token with span
    pub fn new(kind: TokenKind<'a>, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    False,
    None,
    True,
    And,
    As,
    Assert,
    Async,
    Await,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    Nonlocal,
    Not,
    Or,
    Pass,
    Raise,
    Return,
    Try,
    While,
    With,
    Yield,
}

impl Keyword {
    /// Look up a keyword by its spelling
    pub fn lookup(word: &str) -> Option<Self> {
        let keyword = match word {
            "False" => Self::False,
            "None" => Self::None,
            "True" => Self::True,
            "and" => Self::And,
            "as" => Self::As,
            "assert" => Self::Assert,
            "async" => Self::Async,
            "await" => Self::Await,
            "break" => Self::Break,
            "class" => Self::Class,
            "continue" => Self::Continue,
            "def" => Self::Def,
            "del" => Self::Del,
            "elif" => Self::Elif,
            "else" => Self::Else,
            "except" => Self::Except,
            "finally" => Self::Finally,
            "for" => Self::For,
            "from" => Self::From,
            "global" => Self::Global,
            "if" => Self::If,
            "import" => Self::Import,
            "in" => Self::In,
            "is" => Self::Is,
            "lambda" => Self::Lambda,
            "nonlocal" => Self::Nonlocal,
            "not" => Self::Not,
            "or" => Self::Or,
            "pass" => Self::Pass,
            "raise" => Self::Raise,
            "return" => Self::Return,
            "try" => Self::Try,
            "while" => Self::While,
            "with" => Self::With,
            "yield" => Self::Yield,
            _ => return None,
        };
        Some(keyword)
    }
}

/// The kind of token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    // Literals and names
    /// Identifier
    Name(&'a str),
    /// Numeric literal, verbatim
    Number(&'a str),
    /// String literal including prefix and quotes
    String(&'a str),
    /// Reserved word
    Keyword(Keyword),

    // Layout
    /// End of a logical line
    Newline,
    /// Indentation increase
    Indent,
    /// Indentation decrease
    Dedent,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Ellipsis,
    /// Return annotation marker (->)
    Arrow,
    /// Decorator or matrix multiplication (@)
    At,
    /// Assignment (=)
    Assign,
    /// Assignment expression (:=)
    Walrus,
    /// Augmented assignment (+=, <<=, ...)
    AugAssign(&'a str),

    // Operators
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    Tilde,
    Ampersand,
    Pipe,
    Caret,
    LeftShift,
    RightShift,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,

    /// End of input
    Eof,
}

impl TokenKind<'_> {
    /// Check whether this token is the given keyword
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, Self::Keyword(k) if *k == keyword)
    }

    /// Binding power of binary arithmetic and bitwise operators
    ///
    /// Higher binds tighter. `**` is handled separately.
    pub fn binary_precedence(&self) -> Option<u8> {
        let precedence = match self {
            Self::Pipe => 1,
            Self::Caret => 2,
            Self::Ampersand => 3,
            Self::LeftShift | Self::RightShift => 4,
            Self::Plus | Self::Minus => 5,
            Self::Star | Self::At | Self::Slash | Self::DoubleSlash | Self::Percent => 6,
            _ => return None,
        };
        Some(precedence)
    }

    /// Check whether this token starts a comparison operator
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Less
                | Self::Greater
                | Self::LessEqual
                | Self::GreaterEqual
                | Self::Keyword(Keyword::In | Keyword::Is | Keyword::Not)
        )
    }

    /// Check whether the token is a name-like word (identifier, number or keyword)
    pub fn is_word(&self) -> bool {
        matches!(self, Self::Name(_) | Self::Number(_) | Self::Keyword(_))
    }
}
