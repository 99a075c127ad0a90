//! The interpreter driver.

use std::{cell::RefCell, future::Future, rc::Rc};

use compact_str::CompactString;
use log::debug;
use thiserror::Error;

use crate::{
    compiler::{self, error::CompileError},
    context::{ContextKind, Linkage, OperationContext},
    errors::{Error, RuntimeError, RuntimeErrorKind, Signal},
    libs,
    objects::{CallbackInner, Handle, IntoValue, Map, MapInner, Value},
    operation::{Program, call_function_as},
};

/// Interpreter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// How deep script function calls may nest.
    pub max_call_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_call_depth: 128,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Options::default()
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}

/// How a run ended, when it did not fail.
#[derive(Debug, Clone)]
pub enum Completion {
    /// The chunk ran to its end or returned at top level.
    Done(Value),
    /// The program called `exit`.
    Exit(String),
    /// A nested session must take over.
    NewShell(Handle),
}

/// A failure of [`Interpreter::run_source`].
#[derive(Error, Debug, Clone)]
pub enum RunError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Compiles and runs GreyScript chunks against a capability table.
///
/// The table starts with the intrinsics of [`libs`]; the host adds its own
/// capabilities with [`register`](Self::register) before running anything.
#[derive(Debug)]
pub struct Interpreter {
    api: Map,
    options: Rc<Options>,
    /// The global context of the latest run, used to call back into script
    /// functions.
    global: RefCell<Option<Rc<OperationContext>>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        let api = Rc::new(MapInner::new());
        libs::load_libs(&api);
        Interpreter {
            api,
            options: Rc::new(options),
            global: RefCell::new(None),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The capability table.
    pub fn api(&self) -> &Map {
        &self.api
    }

    /// Binds a capability.
    pub fn register(&self, name: impl Into<CompactString>, value: impl IntoValue) {
        self.api.insert(name, value.into_value());
    }

    /// Binds a synchronous host function.
    pub fn register_callback<F>(&self, name: &str, function: F)
    where
        F: Fn(Vec<Value>) -> Result<Value, Error> + 'static,
    {
        self.register(name, CallbackInner::from_fn(name, function));
    }

    /// Binds a host function that suspends the script until its future
    /// resolves.
    pub fn register_async<F, Fut>(&self, name: &str, function: F)
    where
        F: Fn(Vec<Value>) -> Fut + 'static,
        Fut: Future<Output = Result<Value, Error>> + 'static,
    {
        self.register(name, CallbackInner::from_async(name, function));
    }

    pub fn compile(&self, input: &str) -> Result<Program, CompileError> {
        compiler::compile(input)
    }

    fn new_global(&self) -> Rc<OperationContext> {
        OperationContext::api(&self.api, Rc::clone(&self.options))
            .fork(ContextKind::Global, Linkage::Default)
    }

    /// Runs a compiled chunk. `params` is bound as the `params` list.
    ///
    /// Exit and new-shell signals end the run normally; only runtime errors
    /// are failures.
    pub async fn run(&self, program: &Program, params: Vec<Value>) -> Result<Completion, RuntimeError> {
        let global = self.new_global();
        global.set("params", Value::from(params));
        if let Some(previous) = self.global.replace(Some(Rc::clone(&global))) {
            retire(previous);
        }

        let outcome = program.body.run(&global).await;
        let value = global
            .function_state
            .as_ref()
            .map(|state| state.take_value())
            .unwrap_or_default();
        global.frames.collect();

        match outcome {
            Ok(()) => Ok(Completion::Done(value)),
            Err(Error::Signal(Signal::Exit(message))) => {
                debug!("exit signal: {message}");
                Ok(Completion::Exit(message))
            }
            Err(Error::Signal(Signal::NewShell(handle))) => {
                debug!("new shell signal: {handle}");
                Ok(Completion::NewShell(handle))
            }
            Err(Error::Runtime(e)) => Err(e),
        }
    }

    /// Compiles and runs `input`.
    pub async fn run_source(&self, input: &str, params: Vec<Value>) -> Result<Completion, RunError> {
        let program = self.compile(input)?;
        Ok(self.run(&program, params).await?)
    }

    /// Calls a script function value from the host, in a CALL context.
    ///
    /// Free names resolve against the globals of the latest run.
    pub async fn call_function(&self, function: &Value, args: Vec<Value>) -> Result<Value, Error> {
        let Value::Function(function) = function else {
            return Err(RuntimeErrorKind::NotCallable(function.value_type()).into());
        };
        let caller = self
            .global
            .borrow()
            .clone()
            .unwrap_or_else(|| self.new_global());
        let result = call_function_as(&caller, function, None, args, ContextKind::Call).await;
        caller.frames.collect_if_due();
        result
    }

    /// Calls the function bound to `name` in the globals of the latest run.
    pub async fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, Error> {
        let caller = self
            .global
            .borrow()
            .clone()
            .unwrap_or_else(|| self.new_global());
        let function = caller.get_callable(name)?;
        let result = call_function_as(&caller, &function, None, args, ContextKind::Call).await;
        caller.frames.collect_if_due();
        result
    }

    /// Frees the frames of the latest run that only its own garbage still
    /// refers to.
    pub fn collect(&self) -> usize {
        self.global
            .borrow()
            .as_ref()
            .map_or(0, |global| global.frames.collect())
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        if let Some(global) = self.global.get_mut().take() {
            retire(global);
        }
    }
}

/// Drops the global context of a finished run and frees the frames only it
/// kept reachable.
fn retire(global: Rc<OperationContext>) {
    let frames = Rc::clone(&global.frames);
    drop(global);
    frames.collect();
}
