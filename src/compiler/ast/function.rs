use std::fmt;

use text_size::TextRange;

use crate::utils::Join;

use super::*;

/// A function literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub params: Vec<Param>,
    pub body: Block,
    pub range: TextRange,
}

impl_locatable!(Function);

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "function({})\n{}end function",
            self.params.iter().join(", "),
            self.body
        )
    }
}

/// A declared parameter, with an optional literal default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub ident: Ident,
    pub default: Option<Lit>,
    pub range: TextRange,
}

impl_locatable!(Param);

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(default) = &self.default {
            write!(f, "{}={default}", self.ident)
        } else {
            write!(f, "{}", self.ident)
        }
    }
}
