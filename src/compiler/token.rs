//! The tokens.

use std::fmt;

use text_size::TextRange;

use crate::utils::Location;

/// A token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: TextRange,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, range: TextRange, location: Location) -> Self {
        Token {
            kind,
            range,
            location,
        }
    }

    /// The raw source text of this token.
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        &input[self.range]
    }
}

/// Coarse classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    Eof,
    StringLiteral,
    NumericLiteral,
    BooleanLiteral,
    NilLiteral,
    Identifier,
    Keyword,
    Punctuator,
    Eol,
    Comment,
}

/// Kind of token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    If,
    Then,
    Else,
    End,
    While,
    For,
    In,
    Function,
    Return,
    Break,
    Continue,
    And,
    Or,
    Not,
    New,
    Isa,
    True,
    False,
    Null,

    // Operators
    /// +
    Add,
    /// -
    Sub,
    /// *
    Mul,
    /// /
    Div,
    /// %
    Rem,
    /// ^
    Pow,
    /// ==
    Eq,
    /// !=
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// =
    Assign,
    /// +=
    AddAssign,
    /// -=
    SubAssign,
    /// *=
    MulAssign,
    /// /=
    DivAssign,
    /// %=
    RemAssign,
    /// ^=
    PowAssign,

    // Punctuation
    /// (
    OpenParen,
    /// )
    CloseParen,
    /// [
    OpenBracket,
    /// ]
    CloseBracket,
    /// {
    OpenBrace,
    /// }
    CloseBrace,
    /// ,
    Comma,
    /// .
    Dot,
    /// :
    Colon,
    /// @
    At,

    // Other
    /// Newline or `;`.
    Eol,
    /// `// ...`
    Comment,
    /// `// debugger`
    Debugger,
    Ident,
    Number,
    Str,
    Eof,
}

impl TokenKind {
    /// Comments never take part in the grammar of the statement they
    /// appear in.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::Debugger)
    }

    pub fn category(self) -> TokenCategory {
        match self {
            TokenKind::Eof => TokenCategory::Eof,
            TokenKind::Str => TokenCategory::StringLiteral,
            TokenKind::Number => TokenCategory::NumericLiteral,
            TokenKind::True | TokenKind::False => TokenCategory::BooleanLiteral,
            TokenKind::Null => TokenCategory::NilLiteral,
            TokenKind::Ident => TokenCategory::Identifier,
            TokenKind::Eol => TokenCategory::Eol,
            TokenKind::Comment | TokenKind::Debugger => TokenCategory::Comment,
            TokenKind::If
            | TokenKind::Then
            | TokenKind::Else
            | TokenKind::End
            | TokenKind::While
            | TokenKind::For
            | TokenKind::In
            | TokenKind::Function
            | TokenKind::Return
            | TokenKind::Break
            | TokenKind::Continue
            | TokenKind::And
            | TokenKind::Or
            | TokenKind::Not
            | TokenKind::New
            | TokenKind::Isa => TokenCategory::Keyword,
            _ => TokenCategory::Punctuator,
        }
    }

    /// Looks up a keyword in the table bucketed by length.
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        KEYWORDS
            .get(ident.len())?
            .iter()
            .find(|(name, _)| *name == ident)
            .map(|(_, kind)| *kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::If => "if",
            TokenKind::Then => "then",
            TokenKind::Else => "else",
            TokenKind::End => "end",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::In => "in",
            TokenKind::Function => "function",
            TokenKind::Return => "return",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::New => "new",
            TokenKind::Isa => "isa",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::Add => "+",
            TokenKind::Sub => "-",
            TokenKind::Mul => "*",
            TokenKind::Div => "/",
            TokenKind::Rem => "%",
            TokenKind::Pow => "^",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Assign => "=",
            TokenKind::AddAssign => "+=",
            TokenKind::SubAssign => "-=",
            TokenKind::MulAssign => "*=",
            TokenKind::DivAssign => "/=",
            TokenKind::RemAssign => "%=",
            TokenKind::PowAssign => "^=",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::OpenBrace => "{",
            TokenKind::CloseBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Colon => ":",
            TokenKind::At => "@",
            TokenKind::Eol => "<eol>",
            TokenKind::Comment => "<comment>",
            TokenKind::Debugger => "<debugger>",
            TokenKind::Ident => "<identifier>",
            TokenKind::Number => "<number>",
            TokenKind::Str => "<string>",
            TokenKind::Eof => "<eof>",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keywords bucketed by their length in bytes.
const KEYWORDS: [&[(&str, TokenKind)]; 9] = [
    &[],
    &[],
    &[
        ("if", TokenKind::If),
        ("in", TokenKind::In),
        ("or", TokenKind::Or),
    ],
    &[
        ("end", TokenKind::End),
        ("for", TokenKind::For),
        ("and", TokenKind::And),
        ("not", TokenKind::Not),
        ("new", TokenKind::New),
        ("isa", TokenKind::Isa),
    ],
    &[
        ("then", TokenKind::Then),
        ("else", TokenKind::Else),
        ("true", TokenKind::True),
        ("null", TokenKind::Null),
    ],
    &[
        ("while", TokenKind::While),
        ("break", TokenKind::Break),
        ("false", TokenKind::False),
    ],
    &[("return", TokenKind::Return)],
    &[],
    &[
        ("function", TokenKind::Function),
        ("continue", TokenKind::Continue),
    ],
];
