//! The operation context chain: scopes, activation records and the control
//! records that `break`, `continue` and `return` write to.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use compact_str::CompactString;
use derive_more::Display;
use log::trace;

use crate::{
    collector::FrameRegistry,
    errors::{Error, RuntimeErrorKind},
    interpreter::Options,
    objects::{Function, Map, MapInner, Value},
};

/// Kind of an operation context.
///
/// Map constructors have no kind of their own: their entries evaluate in the
/// enclosing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ContextKind {
    /// Root holding the host capability table.
    #[display("api")]
    Api,
    /// One per chunk run.
    #[display("global")]
    Global,
    /// A script function call.
    #[display("function")]
    Function,
    /// A loop body.
    #[display("loop")]
    Loop,
    /// A function call made by the host.
    #[display("call")]
    Call,
}

impl ContextKind {
    pub fn is_function(self) -> bool {
        matches!(self, ContextKind::Function | ContextKind::Call)
    }
}

/// Whether a context owns a variable frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Linkage {
    #[display("default")]
    Default,
    /// Delegates every variable read and write to its parent.
    #[display("temporary")]
    Temporary,
}

/// Flags of the innermost loop.
#[derive(Debug, Default)]
pub struct LoopState {
    pub is_break: Cell<bool>,
    pub is_continue: Cell<bool>,
}

/// Return slot of the innermost function frame.
#[derive(Debug, Default)]
pub struct FunctionState {
    pub is_return: Cell<bool>,
    pub value: RefCell<Value>,
    /// The value `self` resolves to.
    pub receiver: Option<Value>,
}

impl FunctionState {
    pub fn with_receiver(receiver: Option<Value>) -> Self {
        FunctionState {
            receiver,
            ..FunctionState::default()
        }
    }

    pub fn set_return(&self, value: Value) {
        *self.value.borrow_mut() = value;
        self.is_return.set(true);
    }

    pub fn take_value(&self) -> Value {
        self.value.take()
    }
}

/// An environment frame.
pub struct OperationContext {
    pub kind: ContextKind,
    pub linkage: Linkage,
    scope: Map,
    pub loop_state: Option<Rc<LoopState>>,
    pub function_state: Option<Rc<FunctionState>>,
    /// The context this one was forked from.
    pub previous: Option<Rc<OperationContext>>,
    /// Number of function frames below this context.
    pub call_depth: usize,
    pub options: Rc<Options>,
    /// Frames captured by closures, shared by the whole run.
    pub frames: Rc<FrameRegistry>,
    captured: Cell<bool>,
}

impl fmt::Debug for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationContext")
            .field("kind", &self.kind)
            .field("linkage", &self.linkage)
            .field("scope", &self.scope.entries().keys().collect::<Vec<_>>())
            .field("call_depth", &self.call_depth)
            .finish_non_exhaustive()
    }
}

impl OperationContext {
    /// The root context, holding the capability table.
    pub fn api(api: &MapInner, options: Rc<Options>) -> Rc<Self> {
        let scope = Rc::new(MapInner::new());
        scope.extend(api);
        Rc::new(OperationContext {
            kind: ContextKind::Api,
            linkage: Linkage::Default,
            scope,
            loop_state: None,
            function_state: None,
            previous: None,
            call_depth: 0,
            options,
            frames: Rc::new(FrameRegistry::new()),
            captured: Cell::new(false),
        })
    }

    /// Creates a child context.
    ///
    /// Loop and function contexts start fresh control records, everything
    /// else shares the records of its parent.
    pub fn fork(self: &Rc<Self>, kind: ContextKind, linkage: Linkage) -> Rc<Self> {
        let function_state = if kind.is_function() || kind == ContextKind::Global {
            Some(Rc::new(FunctionState::default()))
        } else {
            self.function_state.clone()
        };
        self.fork_with(kind, linkage, function_state, self.call_depth)
    }

    /// Creates the frame of a function call with `self` bound to `receiver`.
    pub fn fork_call(
        self: &Rc<Self>,
        kind: ContextKind,
        receiver: Option<Value>,
        call_depth: usize,
    ) -> Result<Rc<Self>, Error> {
        if call_depth > self.options.max_call_depth {
            return Err(RuntimeErrorKind::StackOverflow(self.options.max_call_depth).into());
        }
        let state = Rc::new(FunctionState::with_receiver(receiver));
        Ok(self.fork_with(kind, Linkage::Default, Some(state), call_depth))
    }

    fn fork_with(
        self: &Rc<Self>,
        kind: ContextKind,
        linkage: Linkage,
        function_state: Option<Rc<FunctionState>>,
        call_depth: usize,
    ) -> Rc<Self> {
        trace!("fork {kind} context ({linkage}) from {}", self.kind);
        let loop_state = match kind {
            ContextKind::Loop => Some(Rc::new(LoopState::default())),
            k if k.is_function() => None,
            _ => self.loop_state.clone(),
        };
        Rc::new(OperationContext {
            kind,
            linkage,
            scope: Rc::new(MapInner::new()),
            loop_state,
            function_state,
            previous: Some(Rc::clone(self)),
            call_depth,
            options: Rc::clone(&self.options),
            frames: Rc::clone(&self.frames),
            captured: Cell::new(false),
        })
    }

    pub(crate) fn scope(&self) -> &Map {
        &self.scope
    }

    /// Records that a closure keeps this context alive.
    pub(crate) fn capture(self: &Rc<Self>) {
        if !self.captured.replace(true) {
            self.frames.record(self);
        }
    }

    /// The context owning the variable frame this one writes to.
    pub fn scope_owner(&self) -> &OperationContext {
        let mut ctx = self;
        while ctx.linkage == Linkage::Temporary {
            match &ctx.previous {
                Some(previous) => ctx = previous,
                None => break,
            }
        }
        ctx
    }

    /// The current variable frame, as exposed by `locals`.
    pub fn locals(&self) -> Map {
        Rc::clone(&self.scope_owner().scope)
    }

    /// The global variable frame, as exposed by `globals`.
    pub fn globals(&self) -> Map {
        let mut ctx = self;
        loop {
            if ctx.kind == ContextKind::Global {
                return Rc::clone(&ctx.scope);
            }
            match &ctx.previous {
                Some(previous) => ctx = previous,
                None => return Rc::clone(&ctx.scope),
            }
        }
    }

    /// The nearest global context, used to call functions that captured
    /// nothing.
    pub fn global_context(self: &Rc<Self>) -> Rc<OperationContext> {
        let mut ctx = self;
        loop {
            if ctx.kind == ContextKind::Global {
                return Rc::clone(ctx);
            }
            match &ctx.previous {
                Some(previous) => ctx = previous,
                None => return Rc::clone(ctx),
            }
        }
    }

    /// The value `self` is bound to in the nearest function frame.
    pub fn receiver(&self) -> Option<Value> {
        self.function_state
            .as_ref()
            .and_then(|state| state.receiver.clone())
    }

    /// Resolves a name: `self`, `locals` and `globals` first, then the
    /// variable frames up the fork chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            "self" => {
                if let Some(receiver) = self.receiver() {
                    return Some(receiver);
                }
            }
            "locals" => return Some(Value::Map(self.locals())),
            "globals" => return Some(Value::Map(self.globals())),
            _ => {}
        }
        let mut ctx = Some(self);
        while let Some(current) = ctx {
            if current.linkage == Linkage::Default
                && let Some(value) = current.scope.get(name)
            {
                return Some(value);
            }
            ctx = current.previous.as_deref();
        }
        None
    }

    /// Like [`get`](Self::get), but an unbound name is a path error.
    pub fn lookup(&self, name: &str) -> Result<Value, Error> {
        self.get(name).ok_or_else(|| {
            RuntimeErrorKind::Path {
                path: CompactString::from(name),
            }
            .into()
        })
    }

    /// Binds a name in the current variable frame.
    pub fn set(&self, name: impl Into<CompactString>, value: Value) {
        self.scope_owner().scope.insert(name, value);
    }

    /// Resolves a name that must be bound to a function.
    pub fn get_callable(&self, name: &str) -> Result<Function, Error> {
        match self.lookup(name)? {
            Value::Function(function) => Ok(function),
            v => Err(RuntimeErrorKind::NotCallable(v.value_type()).into()),
        }
    }

    /// Binds every entry of `map` in the current variable frame.
    pub fn extend(&self, map: &MapInner) {
        self.scope_owner().scope.extend(map);
    }

    /// Whether the body running in this context must stop before its next
    /// statement.
    pub fn should_stop(&self) -> bool {
        self.function_state
            .as_ref()
            .is_some_and(|state| state.is_return.get())
            || self
                .loop_state
                .as_ref()
                .is_some_and(|state| state.is_break.get() || state.is_continue.get())
    }
}
