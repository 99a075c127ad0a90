//! The compiled, runnable form of a chunk.
//!
//! Every node is built once by [`lower`] and can be run any number of times:
//! loop bodies re-run the same [`BodyOperation`] on each iteration, function
//! values share one [`FunctionOperation`].

use std::rc::Rc;

use compact_str::{CompactString, ToCompactString};
use futures::future::{FutureExt, LocalBoxFuture};
use log::debug;

use crate::{
    compiler::ast::BinOp,
    context::{ContextKind, Linkage, OperationContext},
    errors::{Error, RuntimeErrorKind},
    objects::{MapInner, Value},
};

mod arith;
mod expression;
mod function;
mod lower;
mod path;

pub use expression::Expression;
pub use function::{FunctionOperation, Param};
pub use lower::lower;
pub use path::{CallExpression, PathExpression, PathRoot, Segment};

pub(crate) use path::{call_function, call_function_as};

/// A compiled chunk, ready to run.
#[derive(Debug, Clone)]
pub struct Program {
    pub body: Rc<BodyOperation>,
}

/// One statement and the source line it starts on.
#[derive(Debug)]
pub struct Step {
    pub line: u32,
    pub operation: Operation,
}

/// A statement list, run in order until a control record asks to stop.
#[derive(Debug, Default)]
pub struct BodyOperation {
    pub steps: Vec<Step>,
}

impl BodyOperation {
    pub fn run<'a>(&'a self, ctx: &'a Rc<OperationContext>) -> LocalBoxFuture<'a, Result<(), Error>> {
        async move {
            for step in &self.steps {
                step.operation
                    .run(ctx, step.line)
                    .await
                    .map_err(|e| e.with_line(step.line))?;
                if ctx.should_stop() {
                    break;
                }
            }
            Ok(())
        }
        .boxed_local()
    }
}

/// A statement.
#[derive(Debug)]
pub enum Operation {
    If(IfOperation),
    While(WhileOperation),
    For(ForOperation),
    Return(Option<Expression>),
    Break,
    Continue,
    Assign(AssignOperation),
    Expression(Expression),
    Debugger,
}

impl Operation {
    pub fn run<'a>(
        &'a self,
        ctx: &'a Rc<OperationContext>,
        line: u32,
    ) -> LocalBoxFuture<'a, Result<(), Error>> {
        async move {
            match self {
                Operation::If(op) => op.run(ctx).await,
                Operation::While(op) => op.run(ctx).await,
                Operation::For(op) => op.run(ctx).await,
                Operation::Return(argument) => {
                    let value = match argument {
                        Some(argument) => argument.evaluate(ctx).await?,
                        None => Value::Nil,
                    };
                    if let Some(state) = &ctx.function_state {
                        state.set_return(value);
                    }
                    Ok(())
                }
                Operation::Break => {
                    if let Some(state) = &ctx.loop_state {
                        state.is_break.set(true);
                    }
                    Ok(())
                }
                Operation::Continue => {
                    if let Some(state) = &ctx.loop_state {
                        state.is_continue.set(true);
                    }
                    Ok(())
                }
                Operation::Assign(op) => op.run(ctx).await,
                Operation::Expression(expr) => expr.evaluate(ctx).await.map(drop),
                Operation::Debugger => run_debugger(ctx, line).await,
            }
        }
        .boxed_local()
    }
}

async fn run_debugger(ctx: &Rc<OperationContext>, line: u32) -> Result<(), Error> {
    if let Some(Value::Function(hook)) = ctx.get("debugger") {
        debug!("debugger hook at line {line}");
        call_function(ctx, &hook, None, vec![Value::from(line)]).await?;
    } else {
        debug!("debugger at line {line}: {}", Value::Map(ctx.locals()));
    }
    Ok(())
}

/// `if` / `else if` / `else`. The first truthy clause runs, nothing falls
/// through.
#[derive(Debug)]
pub struct IfOperation {
    pub clauses: Vec<(Expression, BodyOperation)>,
    pub alternate: Option<BodyOperation>,
}

impl IfOperation {
    async fn run(&self, ctx: &Rc<OperationContext>) -> Result<(), Error> {
        for (test, body) in &self.clauses {
            if test.evaluate(ctx).await?.is_truthy() {
                return body.run(ctx).await;
            }
        }
        if let Some(alternate) = &self.alternate {
            alternate.run(ctx).await?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct WhileOperation {
    pub test: Expression,
    pub body: BodyOperation,
}

impl WhileOperation {
    async fn run(&self, ctx: &Rc<OperationContext>) -> Result<(), Error> {
        let loop_ctx = ctx.fork(ContextKind::Loop, Linkage::Temporary);
        loop {
            if !self.test.evaluate(&loop_ctx).await?.is_truthy() {
                break;
            }
            if !run_iteration(&self.body, &loop_ctx).await? {
                break;
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ForOperation {
    pub variable: CompactString,
    pub iterable: Expression,
    pub body: BodyOperation,
}

impl ForOperation {
    async fn run(&self, ctx: &Rc<OperationContext>) -> Result<(), Error> {
        let iterable = self.iterable.evaluate(ctx).await?;
        let items = iteration_items(&iterable)?;
        let loop_ctx = ctx.fork(ContextKind::Loop, Linkage::Temporary);
        for item in items {
            loop_ctx.set(self.variable.clone(), item);
            if !run_iteration(&self.body, &loop_ctx).await? {
                break;
            }
        }
        Ok(())
    }
}

/// Runs one loop iteration. Returns whether the loop goes on.
async fn run_iteration(body: &BodyOperation, loop_ctx: &Rc<OperationContext>) -> Result<bool, Error> {
    if let Some(state) = &loop_ctx.loop_state {
        state.is_continue.set(false);
    }
    body.run(loop_ctx).await?;
    let returned = loop_ctx
        .function_state
        .as_ref()
        .is_some_and(|state| state.is_return.get());
    let broke = loop_ctx
        .loop_state
        .as_ref()
        .is_some_and(|state| state.is_break.get());
    Ok(!returned && !broke)
}

/// The sequence a `for` loop walks. Lists are copied first, so the body may
/// mutate the list it iterates.
fn iteration_items(iterable: &Value) -> Result<Vec<Value>, Error> {
    match iterable {
        Value::Nil => Ok(Vec::new()),
        Value::List(list) => Ok(list.snapshot()),
        Value::String(s) => Ok(s
            .chars()
            .map(|c| Value::String(c.to_compact_string()))
            .collect()),
        Value::Map(map) => Ok(map
            .snapshot()
            .into_iter()
            .map(|(key, value)| {
                let entry = MapInner::new();
                entry.insert("key", key);
                entry.insert("value", value);
                Value::from(entry)
            })
            .collect()),
        v => Err(RuntimeErrorKind::NotIterable(v.value_type()).into()),
    }
}

/// Where an assignment writes.
#[derive(Debug)]
pub enum AssignTarget {
    /// A variable of the current frame.
    Name(CompactString),
    /// `container.name`
    Member {
        container: Expression,
        name: CompactString,
    },
    /// `container[index]`
    Index {
        container: Expression,
        index: Expression,
    },
}

/// `target = value`, or `target op= value` when `operator` is set.
#[derive(Debug)]
pub struct AssignOperation {
    pub target: AssignTarget,
    pub operator: Option<BinOp>,
    pub value: Expression,
}

impl AssignOperation {
    async fn run(&self, ctx: &Rc<OperationContext>) -> Result<(), Error> {
        match &self.target {
            AssignTarget::Name(name) => {
                let value = self.value.evaluate(ctx).await?;
                let value = match self.operator {
                    Some(operator) => {
                        let current = ctx.lookup(name)?;
                        arith::binary(operator, &current, &value)?
                    }
                    None => value,
                };
                ctx.set(name.clone(), value);
            }
            AssignTarget::Member { container, name } => {
                let container = container.evaluate(ctx).await?;
                let key = Value::String(name.clone());
                self.assign_into(ctx, &container, &key).await?;
            }
            AssignTarget::Index { container, index } => {
                let container = container.evaluate(ctx).await?;
                let key = index.evaluate(ctx).await?;
                self.assign_into(ctx, &container, &key).await?;
            }
        }
        Ok(())
    }

    async fn assign_into(
        &self,
        ctx: &Rc<OperationContext>,
        container: &Value,
        key: &Value,
    ) -> Result<(), Error> {
        let value = self.value.evaluate(ctx).await?;
        let value = match self.operator {
            Some(operator) => {
                let current = path::read_raw(container, key)?;
                arith::binary(operator, &current, &value)?
            }
            None => value,
        };
        path::write(container, key, value)?;
        Ok(())
    }
}
