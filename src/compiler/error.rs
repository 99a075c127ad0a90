//! The compiler error types.

use thiserror::Error;

use crate::utils::{Join, Location};

use super::token::TokenKind;

/// A malformed token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated string ({location})")]
    UnterminatedString { location: Location },
    #[error("invalid character {ch:?} ({location})")]
    InvalidCharacter { ch: char, location: Location },
}

impl LexError {
    pub fn location(&self) -> Location {
        match self {
            LexError::UnterminatedString { location }
            | LexError::InvalidCharacter { location, .. } => *location,
        }
    }
}

/// A grammar violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(
        "unexpected token (expected {}, found {found}) ({location})",
        .expected.iter().join(", "),
    )]
    UnexpectedToken {
        expected: Vec<TokenKind>,
        found: TokenKind,
        location: Location,
    },
    #[error("invalid number literal {text:?} ({location})")]
    InvalidNumber { text: String, location: Location },
    #[error("invalid assignment target ({location})")]
    InvalidAssignTarget { location: Location },
    #[error("break outside loop ({location})")]
    BreakOutsideLoop { location: Location },
    #[error("continue outside loop ({location})")]
    ContinueOutsideLoop { location: Location },
}

impl ParseError {
    pub fn location(&self) -> Location {
        match self {
            ParseError::Lex(e) => e.location(),
            ParseError::UnexpectedToken { location, .. }
            | ParseError::InvalidNumber { location, .. }
            | ParseError::InvalidAssignTarget { location }
            | ParseError::BreakOutsideLoop { location }
            | ParseError::ContinueOutsideLoop { location } => *location,
        }
    }
}

/// Every error reported while compiling one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .errors.iter().join("\n"))]
pub struct CompileError {
    pub errors: Vec<ParseError>,
}

impl From<Vec<ParseError>> for CompileError {
    fn from(errors: Vec<ParseError>) -> Self {
        CompileError { errors }
    }
}

impl From<ParseError> for CompileError {
    fn from(error: ParseError) -> Self {
        CompileError {
            errors: vec![error],
        }
    }
}
