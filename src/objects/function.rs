use std::{fmt, rc::Rc};

use derive_more::From;

use crate::{
    context::OperationContext,
    objects::{Callback, Value},
    operation::FunctionOperation,
    utils::Join,
};

pub type Closure = Rc<ClosureInner>;

/// A script function value.
///
/// Functions defined inside another function keep that frame alive as
/// `outer`; top-level functions resolve free names against the globals of
/// whichever run calls them.
pub struct ClosureInner {
    pub function: Rc<FunctionOperation>,
    pub outer: Option<Rc<OperationContext>>,
}

impl ClosureInner {
    pub fn new(function: Rc<FunctionOperation>, outer: Option<Rc<OperationContext>>) -> Self {
        ClosureInner { function, outer }
    }
}

impl fmt::Debug for ClosureInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureInner")
            .field("params", &self.function.param_names().collect::<Vec<_>>())
            .field("captured", &self.outer.is_some())
            .finish()
    }
}

impl fmt::Display for ClosureInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FUNCTION({})", self.function.param_names().join(", "))
    }
}

impl From<ClosureInner> for Value {
    fn from(value: ClosureInner) -> Value {
        Value::Function(Rc::new(value).into())
    }
}

/// Enum of callable values (Closure / Callback).
#[derive(Debug, Clone, From)]
pub enum Function {
    Closure(Closure),
    Callback(Callback),
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Function::Closure(a), Function::Closure(b)) => Rc::ptr_eq(a, b),
            (Function::Callback(a), Function::Callback(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Closure(v) => write!(f, "{v}"),
            Function::Callback(v) => write!(f, "{v}"),
        }
    }
}
