use std::rc::Rc;

use compact_str::{CompactString, format_compact};
use futures::future::{FutureExt, LocalBoxFuture};
use log::trace;

use crate::{
    context::{ContextKind, OperationContext},
    errors::{Error, RuntimeErrorKind},
    objects::{Function, Value, ValueType, char_at, value_to_index},
    operation::Expression,
};

/// The head of a path: a variable name or any other expression.
#[derive(Debug)]
pub enum PathRoot {
    Name(CompactString),
    Value(Box<Expression>),
}

/// One step of a path.
#[derive(Debug)]
pub enum Segment {
    /// `.name`
    Member(CompactString),
    /// `[index]`
    Index(Expression),
}

/// A chain of member and index steps, such as `a.b[0].c`.
///
/// Reading a path whose value is a function calls it without arguments,
/// unless `invoke` is cleared by `@`.
#[derive(Debug)]
pub struct PathExpression {
    pub root: PathRoot,
    pub segments: Vec<Segment>,
    pub invoke: bool,
}

/// A call with explicit arguments, `callee(args)` or `callee args`.
#[derive(Debug)]
pub struct CallExpression {
    pub callee: PathExpression,
    pub arguments: Vec<Expression>,
}

/// What a path points at before it is read or called.
enum Resolved {
    /// A stored value. `receiver` is the map it was read from.
    Value { value: Value, receiver: Option<Value> },
    /// A builtin method of a string, list or map, or a method of a host
    /// handle.
    Method { target: Value, name: CompactString },
    /// A key absent from a map: reads as `null`, fails when called.
    Missing { name: CompactString },
}

impl PathExpression {
    pub fn evaluate<'a>(
        &'a self,
        ctx: &'a Rc<OperationContext>,
    ) -> LocalBoxFuture<'a, Result<Value, Error>> {
        async move {
            let resolved = self.resolve(ctx).await?;
            match resolved {
                Resolved::Value { value, .. } if !self.invoke => Ok(value),
                resolved => materialize(ctx, resolved).await,
            }
        }
        .boxed_local()
    }

    async fn resolve(&self, ctx: &Rc<OperationContext>) -> Result<Resolved, Error> {
        let mut resolved = match &self.root {
            PathRoot::Name(name) => Resolved::Value {
                value: ctx.lookup(name)?,
                receiver: None,
            },
            PathRoot::Value(expr) => Resolved::Value {
                value: expr.evaluate(ctx).await?,
                receiver: None,
            },
        };
        for segment in &self.segments {
            let container = materialize(ctx, resolved).await?;
            resolved = match segment {
                Segment::Member(name) => member(container, name)?,
                Segment::Index(index) => {
                    let key = index.evaluate(ctx).await?;
                    element(container, &key)?
                }
            };
        }
        Ok(resolved)
    }
}

impl CallExpression {
    pub async fn evaluate(&self, ctx: &Rc<OperationContext>) -> Result<Value, Error> {
        let resolved = self.callee.resolve(ctx).await?;
        let mut args = Vec::with_capacity(self.arguments.len());
        for argument in &self.arguments {
            args.push(argument.evaluate(ctx).await?);
        }
        match resolved {
            Resolved::Value {
                value: Value::Function(function),
                receiver,
            } => call_function(ctx, &function, receiver, args).await,
            Resolved::Value { value, .. } if args.is_empty() => Ok(value),
            Resolved::Value { value, .. } => {
                Err(RuntimeErrorKind::NotCallable(value.value_type()).into())
            }
            Resolved::Method { target, name } => call_method(&target, &name, args).await,
            Resolved::Missing { name } => Err(RuntimeErrorKind::MethodNotFound {
                value_type: ValueType::Map,
                method: name,
            }
            .into()),
        }
    }
}

/// Reads a resolved path, calling functions and methods without arguments.
async fn materialize(ctx: &Rc<OperationContext>, resolved: Resolved) -> Result<Value, Error> {
    match resolved {
        Resolved::Value {
            value: Value::Function(function),
            receiver,
        } => call_function(ctx, &function, receiver, Vec::new()).await,
        Resolved::Value { value, .. } => Ok(value),
        Resolved::Method { target, name } => call_method(&target, &name, Vec::new()).await,
        Resolved::Missing { .. } => Ok(Value::Nil),
    }
}

fn member(container: Value, name: &CompactString) -> Result<Resolved, Error> {
    match &container {
        Value::Map(map) => Ok(match map.lookup(name) {
            Some(value) => Resolved::Value {
                value,
                receiver: Some(container),
            },
            None if container.has_method(name) => Resolved::Method {
                target: container,
                name: name.clone(),
            },
            None => Resolved::Missing { name: name.clone() },
        }),
        Value::Handle(handle) => Ok(match handle.get(name) {
            Some(value) => Resolved::Value {
                value,
                receiver: None,
            },
            None => Resolved::Method {
                target: container,
                name: name.clone(),
            },
        }),
        v if v.has_method(name) => Ok(Resolved::Method {
            target: container,
            name: name.clone(),
        }),
        v => Err(RuntimeErrorKind::MethodNotFound {
            value_type: v.value_type(),
            method: name.clone(),
        }
        .into()),
    }
}

fn element(container: Value, key: &Value) -> Result<Resolved, Error> {
    if let Value::Map(map) = &container {
        let name = key.to_key();
        return Ok(match map.lookup(&name) {
            Some(value) => Resolved::Value {
                value,
                receiver: Some(container),
            },
            None => Resolved::Missing { name },
        });
    }
    let value = read_raw(&container, key)?;
    Ok(Resolved::Value {
        value,
        receiver: None,
    })
}

fn index_error(key: &Value) -> RuntimeErrorKind {
    RuntimeErrorKind::Path {
        path: format_compact!("[{}]", key.repr()),
    }
}

/// Reads `container[key]` without calling the result.
pub(super) fn read_raw(container: &Value, key: &Value) -> Result<Value, Error> {
    match container {
        Value::Map(map) => Ok(map.lookup(&key.to_key()).unwrap_or_default()),
        Value::List(list) => {
            let index = value_to_index(key).ok_or_else(|| index_error(key))?;
            Ok(list.get(index)?)
        }
        Value::String(s) => {
            let index = value_to_index(key).ok_or_else(|| index_error(key))?;
            Ok(char_at(s, index)?)
        }
        Value::Handle(handle) => Ok(handle.get(&key.to_key()).unwrap_or_default()),
        _ => Err(index_error(key).into()),
    }
}

/// Writes `container[key] = value`. Only maps and lists accept writes.
pub(super) fn write(container: &Value, key: &Value, value: Value) -> Result<(), Error> {
    match container {
        Value::Map(map) => {
            map.insert(key.to_key(), value);
            Ok(())
        }
        Value::List(list) => {
            let index = value_to_index(key).ok_or_else(|| index_error(key))?;
            Ok(list.set(index, value)?)
        }
        v => Err(RuntimeErrorKind::ImmutablePath {
            path: key.to_key(),
            value_type: v.value_type(),
        }
        .into()),
    }
}

/// Calls a builtin method or a method of a host handle.
async fn call_method(target: &Value, name: &str, args: Vec<Value>) -> Result<Value, Error> {
    trace!("call method {name} on {}", target.value_type());
    match target {
        Value::Handle(handle) => handle.call_method(name, args)?.resolve().await,
        v => Ok(v.call_method(name, args)?),
    }
}

/// Calls a function value from `caller`, with `self` bound to `receiver`.
pub(crate) async fn call_function(
    caller: &Rc<OperationContext>,
    function: &Function,
    receiver: Option<Value>,
    args: Vec<Value>,
) -> Result<Value, Error> {
    call_function_as(caller, function, receiver, args, ContextKind::Function).await
}

pub(crate) async fn call_function_as(
    caller: &Rc<OperationContext>,
    function: &Function,
    receiver: Option<Value>,
    args: Vec<Value>,
    kind: ContextKind,
) -> Result<Value, Error> {
    match function {
        Function::Closure(closure) => {
            closure
                .function
                .invoke(caller, closure.outer.as_ref(), receiver, args, kind)
                .await
        }
        Function::Callback(callback) => {
            trace!("call {}", callback.name);
            callback.call(args)?.resolve().await
        }
    }
}

