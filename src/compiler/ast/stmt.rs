use std::fmt;

use compact_str::CompactString;
use text_size::TextRange;

use crate::utils::Indent;

use super::*;

/// The root AST node, a whole parsed program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub body: Block,
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.body.body {
            writeln!(f, "{stmt}")?;
        }
        Ok(())
    }
}

/// A sequence of statements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub body: Vec<Stmt>,
    pub range: TextRange,
}

impl_locatable!(Block);

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.body {
            writeln!(f, "{}", stmt.indent(4))?;
        }
        Ok(())
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub range: TextRange,
    /// The source line the statement starts on.
    pub line: u32,
}

impl_locatable!(Stmt);

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// Kind of statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    If {
        clauses: Vec<IfClause>,
        alternate: Option<Block>,
        /// Written on a single line without `end if`.
        shortcut: bool,
    },
    While {
        test: Box<Expr>,
        body: Block,
    },
    For {
        variable: Ident,
        iterable: Box<Expr>,
        body: Block,
    },
    Return {
        argument: Option<Box<Expr>>,
    },
    Break,
    Continue,
    Assign {
        left: Box<Expr>,
        operator: Option<BinOp>,
        right: Box<Expr>,
    },
    Expr(Box<Expr>),
    Comment(CompactString),
    Debugger,
}

impl fmt::Display for StmtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StmtKind::If {
                clauses,
                alternate,
                shortcut: true,
            } => {
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        write!(f, " else ")?;
                    }
                    write!(f, "if {} then {}", clause.test, clause.body.to_string().trim())?;
                }
                if let Some(alternate) = alternate {
                    write!(f, " else {}", alternate.to_string().trim())?;
                }
                Ok(())
            }
            StmtKind::If {
                clauses,
                alternate,
                shortcut: false,
            } => {
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        write!(f, "else ")?;
                    }
                    write!(f, "if {} then\n{}", clause.test, clause.body)?;
                }
                if let Some(alternate) = alternate {
                    write!(f, "else\n{alternate}")?;
                }
                write!(f, "end if")
            }
            StmtKind::While { test, body } => write!(f, "while {test}\n{body}end while"),
            StmtKind::For {
                variable,
                iterable,
                body,
            } => write!(f, "for {variable} in {iterable}\n{body}end for"),
            StmtKind::Return { argument: None } => write!(f, "return"),
            StmtKind::Return {
                argument: Some(argument),
            } => write!(f, "return {argument}"),
            StmtKind::Break => write!(f, "break"),
            StmtKind::Continue => write!(f, "continue"),
            StmtKind::Assign {
                left,
                operator: None,
                right,
            } => write!(f, "{left} = {right}"),
            StmtKind::Assign {
                left,
                operator: Some(operator),
                right,
            } => write!(f, "{left} {operator}= {right}"),
            StmtKind::Expr(expr) => write!(f, "{expr}"),
            StmtKind::Comment(text) => write!(f, "//{text}"),
            StmtKind::Debugger => write!(f, "// debugger"),
        }
    }
}

/// One `if` / `else if` arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfClause {
    pub test: Expr,
    pub body: Block,
    pub range: TextRange,
}

impl_locatable!(IfClause);
