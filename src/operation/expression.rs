use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};

use crate::{
    compiler::ast::{BinOp, UnOp},
    context::{ContextKind, OperationContext},
    errors::{Error, RuntimeErrorKind},
    objects::{ClosureInner, MapInner, Value, slice_str, value_to_index},
    operation::{CallExpression, FunctionOperation, PathExpression, arith},
};

/// An expression, evaluated against a context to one value.
#[derive(Debug)]
pub enum Expression {
    Literal(Value),
    List(Vec<Expression>),
    Map(Vec<(Expression, Expression)>),
    Function(Rc<FunctionOperation>),
    Path(PathExpression),
    Call(CallExpression),
    Slice {
        base: Box<Expression>,
        start: Option<Box<Expression>>,
        end: Option<Box<Expression>>,
    },
    Unary {
        operator: UnOp,
        argument: Box<Expression>,
    },
    Binary {
        operator: BinOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// `and` / `or`: the right side runs only when the left does not decide.
    Logical {
        operator: BinOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn evaluate<'a>(
        &'a self,
        ctx: &'a Rc<OperationContext>,
    ) -> LocalBoxFuture<'a, Result<Value, Error>> {
        async move {
            match self {
                Expression::Literal(value) => Ok(value.clone()),
                Expression::List(items) => {
                    let mut values = Vec::with_capacity(items.len());
                    for item in items {
                        values.push(item.evaluate(ctx).await?);
                    }
                    Ok(Value::from(values))
                }
                Expression::Map(properties) => {
                    let map = MapInner::new();
                    for (key, value) in properties {
                        let key = key.evaluate(ctx).await?;
                        let value = value.evaluate(ctx).await?;
                        map.insert(key.to_key(), value);
                    }
                    Ok(Value::from(map))
                }
                Expression::Function(function) => {
                    // Top-level functions resolve free names against the
                    // globals of the caller.
                    let outer = (ctx.scope_owner().kind != ContextKind::Global).then(|| {
                        ctx.capture();
                        Rc::clone(ctx)
                    });
                    Ok(Value::from(ClosureInner::new(Rc::clone(function), outer)))
                }
                Expression::Path(path) => path.evaluate(ctx).await,
                Expression::Call(call) => call.evaluate(ctx).await,
                Expression::Slice { base, start, end } => {
                    let base = base.evaluate(ctx).await?;
                    let start = evaluate_bound(start.as_deref(), ctx).await?;
                    let end = evaluate_bound(end.as_deref(), ctx).await?;
                    match base {
                        Value::List(list) => Ok(Value::from(list.slice(start, end))),
                        Value::String(s) => Ok(Value::String(slice_str(&s, start, end))),
                        v => Err(RuntimeErrorKind::UnOperator {
                            operator: "[:]",
                            operand: v.value_type(),
                        }
                        .into()),
                    }
                }
                Expression::Unary { operator, argument } => {
                    let argument = argument.evaluate(ctx).await?;
                    Ok(arith::unary(*operator, &argument)?)
                }
                Expression::Binary {
                    operator,
                    left,
                    right,
                } => {
                    let left = left.evaluate(ctx).await?;
                    let right = right.evaluate(ctx).await?;
                    Ok(arith::binary(*operator, &left, &right)?)
                }
                Expression::Logical {
                    operator,
                    left,
                    right,
                } => {
                    let left = left.evaluate(ctx).await?.is_truthy();
                    let decided = match operator {
                        BinOp::And => !left,
                        _ => left,
                    };
                    if decided {
                        return Ok(Value::Boolean(left));
                    }
                    Ok(Value::Boolean(right.evaluate(ctx).await?.is_truthy()))
                }
            }
        }
        .boxed_local()
    }
}

async fn evaluate_bound(
    bound: Option<&Expression>,
    ctx: &Rc<OperationContext>,
) -> Result<Option<i64>, Error> {
    match bound {
        Some(bound) => Ok(value_to_index(&bound.evaluate(ctx).await?)),
        None => Ok(None),
    }
}
