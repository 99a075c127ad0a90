use std::fmt;

use compact_str::CompactString;
use text_size::TextRange;

use crate::utils::{Float, quote_str};

use super::*;

/// A literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lit {
    pub kind: LitKind,
    pub range: TextRange,
}

impl_locatable!(Lit);

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// Kind of literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LitKind {
    /// "null"
    Null,
    /// "true", "false"
    Bool(bool),
    /// "12", "12.34", ".5", "1e3"
    Number(Float),
    /// ""abc""
    Str(CompactString),
}

impl fmt::Display for LitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LitKind::Null => write!(f, "null"),
            LitKind::Bool(v) => write!(f, "{v}"),
            LitKind::Number(v) => write!(f, "{v}"),
            LitKind::Str(v) => write!(f, "{}", quote_str(v)),
        }
    }
}

/// An identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: CompactString,
    pub range: TextRange,
}

impl_locatable!(Ident);

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
