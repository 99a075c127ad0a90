//! Builds the runnable tree from a parsed chunk.

use std::rc::Rc;

use crate::{
    compiler::{
        ast::{self, Block, Chunk, Expr, ExprKind, LitKind, Stmt, StmtKind, UnOp},
        error::ParseError,
    },
    objects::Value,
    operation::{
        AssignOperation, AssignTarget, BodyOperation, CallExpression, Expression, ForOperation,
        FunctionOperation, IfOperation, Operation, Param, PathExpression, PathRoot, Program,
        Segment, Step, WhileOperation,
    },
    utils::{LineIndex, Locatable},
};

/// Lowers a chunk. `line_index` must index the source `chunk` was parsed
/// from.
pub fn lower(chunk: &Chunk, line_index: &LineIndex) -> Result<Program, ParseError> {
    let body = Lower { line_index }.block(&chunk.body)?;
    Ok(Program {
        body: Rc::new(body),
    })
}

struct Lower<'a> {
    line_index: &'a LineIndex,
}

impl Lower<'_> {
    fn block(&self, block: &Block) -> Result<BodyOperation, ParseError> {
        let mut steps = Vec::with_capacity(block.body.len());
        for stmt in &block.body {
            if let Some(operation) = self.stmt(stmt)? {
                steps.push(Step {
                    line: stmt.line,
                    operation,
                });
            }
        }
        Ok(BodyOperation { steps })
    }

    fn stmt(&self, stmt: &Stmt) -> Result<Option<Operation>, ParseError> {
        Ok(Some(match &stmt.kind {
            StmtKind::If {
                clauses, alternate, ..
            } => {
                let clauses = clauses
                    .iter()
                    .map(|clause| Ok((self.expr(&clause.test)?, self.block(&clause.body)?)))
                    .collect::<Result<_, ParseError>>()?;
                let alternate = alternate
                    .as_ref()
                    .map(|block| self.block(block))
                    .transpose()?;
                Operation::If(IfOperation { clauses, alternate })
            }
            StmtKind::While { test, body } => Operation::While(WhileOperation {
                test: self.expr(test)?,
                body: self.block(body)?,
            }),
            StmtKind::For {
                variable,
                iterable,
                body,
            } => Operation::For(ForOperation {
                variable: variable.name.clone(),
                iterable: self.expr(iterable)?,
                body: self.block(body)?,
            }),
            StmtKind::Return { argument } => Operation::Return(
                argument
                    .as_ref()
                    .map(|argument| self.expr(argument))
                    .transpose()?,
            ),
            StmtKind::Break => Operation::Break,
            StmtKind::Continue => Operation::Continue,
            StmtKind::Assign {
                left,
                operator,
                right,
            } => Operation::Assign(AssignOperation {
                target: self.assign_target(left)?,
                operator: *operator,
                value: self.expr(right)?,
            }),
            StmtKind::Expr(expr) => Operation::Expression(self.expr(expr)?),
            StmtKind::Debugger => Operation::Debugger,
            StmtKind::Comment(_) => return Ok(None),
        }))
    }

    fn assign_target(&self, expr: &Expr) -> Result<AssignTarget, ParseError> {
        match &expr.kind {
            ExprKind::Ident(ident) => Ok(AssignTarget::Name(ident.name.clone())),
            ExprKind::Member { base, property } => Ok(AssignTarget::Member {
                container: self.expr(base)?,
                name: property.name.clone(),
            }),
            ExprKind::Index { base, index } => Ok(AssignTarget::Index {
                container: self.expr(base)?,
                index: self.expr(index)?,
            }),
            _ => Err(ParseError::InvalidAssignTarget {
                location: self.line_index.location(expr.range().start()),
            }),
        }
    }

    fn expr(&self, expr: &Expr) -> Result<Expression, ParseError> {
        Ok(match &expr.kind {
            ExprKind::Lit(lit) => Expression::Literal(lit_value(&lit.kind)),
            ExprKind::Ident(ident) => Expression::Path(PathExpression {
                root: PathRoot::Name(ident.name.clone()),
                segments: Vec::new(),
                invoke: true,
            }),
            ExprKind::Paren(inner) => self.expr(inner)?,
            ExprKind::Function(function) => Expression::Function(Rc::new(self.function(function)?)),
            ExprKind::Map { properties } => Expression::Map(
                properties
                    .iter()
                    .map(|property| Ok((self.expr(&property.key)?, self.expr(&property.value)?)))
                    .collect::<Result<_, ParseError>>()?,
            ),
            ExprKind::List { items } => Expression::List(
                items
                    .iter()
                    .map(|item| self.expr(item))
                    .collect::<Result<_, ParseError>>()?,
            ),
            ExprKind::Unary {
                operator: UnOp::Reference,
                argument,
            } => match self.expr(argument)? {
                Expression::Path(path) => Expression::Path(PathExpression {
                    invoke: false,
                    ..path
                }),
                other => other,
            },
            ExprKind::Unary { operator, argument } => Expression::Unary {
                operator: *operator,
                argument: Box::new(self.expr(argument)?),
            },
            ExprKind::Binary {
                operator,
                left,
                right,
                ..
            } => Expression::Binary {
                operator: *operator,
                left: Box::new(self.expr(left)?),
                right: Box::new(self.expr(right)?),
            },
            ExprKind::Logical {
                operator,
                left,
                right,
                ..
            } => Expression::Logical {
                operator: *operator,
                left: Box::new(self.expr(left)?),
                right: Box::new(self.expr(right)?),
            },
            ExprKind::Member { base, property } => {
                let mut path = into_path(self.expr(base)?);
                path.segments.push(Segment::Member(property.name.clone()));
                Expression::Path(path)
            }
            ExprKind::Index { base, index } => {
                let mut path = into_path(self.expr(base)?);
                path.segments.push(Segment::Index(self.expr(index)?));
                Expression::Path(path)
            }
            ExprKind::Slice { base, start, end } => Expression::Slice {
                base: Box::new(self.expr(base)?),
                start: start
                    .as_ref()
                    .map(|start| self.expr(start).map(Box::new))
                    .transpose()?,
                end: end
                    .as_ref()
                    .map(|end| self.expr(end).map(Box::new))
                    .transpose()?,
            },
            ExprKind::Call { callee, arguments } => {
                let callee = match self.expr(callee)? {
                    Expression::Path(path) => path,
                    other => value_path(other),
                };
                let arguments = arguments
                    .iter()
                    .map(|argument| self.expr(argument))
                    .collect::<Result<_, ParseError>>()?;
                Expression::Call(CallExpression { callee, arguments })
            }
        })
    }

    fn function(&self, function: &ast::Function) -> Result<FunctionOperation, ParseError> {
        let params = function
            .params
            .iter()
            .map(|param| Param {
                name: param.ident.name.clone(),
                default: param
                    .default
                    .as_ref()
                    .map_or(Value::Nil, |lit| lit_value(&lit.kind)),
            })
            .collect();
        Ok(FunctionOperation {
            params,
            body: self.block(&function.body)?,
        })
    }
}

fn lit_value(lit: &LitKind) -> Value {
    match lit {
        LitKind::Null => Value::Nil,
        LitKind::Bool(v) => Value::Boolean(*v),
        LitKind::Number(v) => Value::Number(v.0),
        LitKind::Str(v) => Value::String(v.clone()),
    }
}

/// Reuses an auto-invoking path as the base of a longer one.
fn into_path(expr: Expression) -> PathExpression {
    match expr {
        Expression::Path(path) if path.invoke => path,
        other => value_path(other),
    }
}

fn value_path(expr: Expression) -> PathExpression {
    PathExpression {
        root: PathRoot::Value(Box::new(expr)),
        segments: Vec::new(),
        invoke: true,
    }
}
