use std::fmt;

use compact_str::CompactString;
use text_size::TextRange;

use crate::utils::{Indent, Join};

use super::*;

/// An expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub range: TextRange,
}

impl_locatable!(Expr);

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Expr {
    /// Identifier, member access, index access or call: the operands a
    /// condition can be keyed on.
    pub fn is_ident_like(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Ident(_)
                | ExprKind::Member { .. }
                | ExprKind::Index { .. }
                | ExprKind::Call { .. }
        )
    }

    /// Can be the target of an assignment.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Ident(_) | ExprKind::Member { .. } | ExprKind::Index { .. }
        )
    }
}

/// Kind of expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Lit(Lit),
    Ident(Ident),
    Paren(Box<Expr>),
    Function(Box<Function>),
    Map {
        properties: Vec<MapProperty>,
    },
    List {
        items: Vec<Expr>,
    },
    Unary {
        operator: UnOp,
        argument: Box<Expr>,
    },
    Binary {
        operator: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        operands: Vec<CompactString>,
    },
    Logical {
        operator: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        operands: Vec<CompactString>,
    },
    Member {
        base: Box<Expr>,
        property: Ident,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        base: Box<Expr>,
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprKind::Lit(lit) => write!(f, "{lit}"),
            ExprKind::Ident(ident) => write!(f, "{ident}"),
            ExprKind::Paren(expr) => write!(f, "({expr})"),
            ExprKind::Function(function) => write!(f, "{function}"),
            ExprKind::Map { properties } => {
                if properties.is_empty() {
                    write!(f, "{{}}")
                } else {
                    write!(f, "{{\n{}\n}}", properties.iter().join(",\n").indent(4))
                }
            }
            ExprKind::List { items } => write!(f, "[{}]", items.iter().join(", ")),
            ExprKind::Unary { operator, argument } => write!(f, "{operator}{argument}"),
            ExprKind::Binary {
                operator,
                left,
                right,
                ..
            }
            | ExprKind::Logical {
                operator,
                left,
                right,
                ..
            } => write!(f, "{left} {operator} {right}"),
            ExprKind::Member { base, property } => write!(f, "{base}.{property}"),
            ExprKind::Index { base, index } => write!(f, "{base}[{index}]"),
            ExprKind::Slice { base, start, end } => {
                write!(f, "{base}[")?;
                if let Some(start) = start {
                    write!(f, "{start}")?;
                }
                write!(f, ":")?;
                if let Some(end) = end {
                    write!(f, "{end}")?;
                }
                write!(f, "]")
            }
            ExprKind::Call { callee, arguments } => {
                write!(f, "{callee}({})", arguments.iter().join(", "))
            }
        }
    }
}

/// A key / value pair of a map constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapProperty {
    pub key: Expr,
    pub value: Expr,
    pub range: TextRange,
}

impl_locatable!(MapProperty);

impl fmt::Display for MapProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}
