use std::{fmt, future::Future, rc::Rc};

use compact_str::CompactString;
use futures::future::{FutureExt, LocalBoxFuture};

use crate::{errors::Error, objects::Value};

/// What a host function hands back to the interpreter.
pub enum CallbackReturn {
    /// The call completed synchronously.
    Return(Value),
    /// The call suspends the script until the future resolves.
    Pending(LocalBoxFuture<'static, Result<Value, Error>>),
}

impl CallbackReturn {
    /// Waits for the value of a pending call.
    pub async fn resolve(self) -> Result<Value, Error> {
        match self {
            CallbackReturn::Return(v) => Ok(v),
            CallbackReturn::Pending(future) => future.await,
        }
    }
}

impl fmt::Debug for CallbackReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackReturn::Return(v) => f.debug_tuple("Return").field(v).finish(),
            CallbackReturn::Pending(_) => f.write_str("Pending"),
        }
    }
}

impl From<Value> for CallbackReturn {
    fn from(value: Value) -> Self {
        CallbackReturn::Return(value)
    }
}

pub trait CallbackFn {
    fn call(&self, args: Vec<Value>) -> Result<CallbackReturn, Error>;
}

impl<F: Fn(Vec<Value>) -> Result<CallbackReturn, Error>> CallbackFn for F {
    fn call(&self, args: Vec<Value>) -> Result<CallbackReturn, Error> {
        self(args)
    }
}

pub type Callback = Rc<CallbackInner>;

/// A named host function.
pub struct CallbackInner {
    pub name: CompactString,
    function: Box<dyn CallbackFn>,
}

impl CallbackInner {
    pub fn new<C: CallbackFn + 'static>(name: impl Into<CompactString>, function: C) -> Self {
        CallbackInner {
            name: name.into(),
            function: Box::new(function),
        }
    }

    /// A callback that always completes synchronously.
    pub fn from_fn<F>(name: impl Into<CompactString>, function: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, Error> + 'static,
    {
        CallbackInner::new(name, move |args| function(args).map(CallbackReturn::Return))
    }

    /// A callback that suspends the script on every call.
    pub fn from_async<F, Fut>(name: impl Into<CompactString>, function: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + 'static,
        Fut: Future<Output = Result<Value, Error>> + 'static,
    {
        CallbackInner::new(name, move |args| {
            Ok(CallbackReturn::Pending(function(args).boxed_local()))
        })
    }

    pub fn call(&self, args: Vec<Value>) -> Result<CallbackReturn, Error> {
        self.function.call(args)
    }
}

impl fmt::Debug for CallbackInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackInner")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for CallbackInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FUNCTION(...)")
    }
}

impl From<CallbackInner> for Value {
    fn from(value: CallbackInner) -> Value {
        Value::Function(Rc::new(value).into())
    }
}
