use std::rc::Rc;

use compact_str::CompactString;
use log::trace;

use crate::{
    context::{ContextKind, OperationContext},
    errors::{Error, RuntimeErrorKind},
    objects::Value,
    operation::BodyOperation,
    utils::GrowStack,
};

/// A declared parameter and its default.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: CompactString,
    pub default: Value,
}

/// The shared body of every closure created from one `function` literal.
#[derive(Debug)]
pub struct FunctionOperation {
    pub params: Vec<Param>,
    pub body: BodyOperation,
}

impl FunctionOperation {
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|param| param.name.as_str())
    }

    /// Runs the body in a fresh frame forked from `outer`, or from the
    /// caller's globals when the function captured nothing.
    pub(crate) async fn invoke(
        &self,
        caller: &Rc<OperationContext>,
        outer: Option<&Rc<OperationContext>>,
        receiver: Option<Value>,
        args: Vec<Value>,
        kind: ContextKind,
    ) -> Result<Value, Error> {
        if args.len() > self.params.len() {
            return Err(RuntimeErrorKind::CallArguments {
                expected: self.params.len(),
                given: args.len(),
            }
            .into());
        }
        let base = match outer {
            Some(outer) => Rc::clone(outer),
            None => caller.global_context(),
        };
        let frame = base.fork_call(kind, receiver, caller.call_depth + 1)?;
        trace!(
            "call function({}) with {} arguments at depth {}",
            self.params.len(),
            args.len(),
            frame.call_depth
        );

        // Parameters are bound last to first, taking arguments off the end.
        let mut args: Vec<Option<Value>> = args.into_iter().map(Some).collect();
        args.resize(self.params.len(), None);
        for param in self.params.iter().rev() {
            let value = args
                .pop()
                .flatten()
                .unwrap_or_else(|| param.default.clone());
            frame.set(param.name.clone(), value);
        }

        GrowStack(self.body.run(&frame)).await?;
        let value = frame
            .function_state
            .as_ref()
            .map(|state| state.take_value())
            .unwrap_or_default();
        frame.frames.collect_if_due();
        Ok(value)
    }
}
