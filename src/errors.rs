//! Runtime errors and control signals.

use std::fmt;

use compact_str::CompactString;
use thiserror::Error;

use crate::{
    objects::{Handle, ValueType},
    utils::Join,
};

/// Anything that aborts the evaluation of a chunk.
///
/// Signals travel through the same channel as failures but are told apart by
/// type: only [`Error::Runtime`] is a real failure.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Signal(#[from] Signal),
}

impl Error {
    /// Attaches a source line to a runtime error that does not carry one yet.
    #[must_use]
    pub fn with_line(self, line: u32) -> Self {
        match self {
            Error::Runtime(RuntimeError { kind, line: None }) => Error::Runtime(RuntimeError {
                kind,
                line: Some(line),
            }),
            other => other,
        }
    }

    pub fn is_signal(&self) -> bool {
        matches!(self, Error::Signal(_))
    }

    /// Shorthand for a host failure carrying a message.
    pub fn host(message: impl Into<String>) -> Self {
        RuntimeErrorKind::Host(message.into()).into()
    }
}

impl From<RuntimeErrorKind> for Error {
    fn from(kind: RuntimeErrorKind) -> Self {
        Error::Runtime(kind.into())
    }
}

/// Intentional control transfer out of a running chunk.
#[derive(Error, Debug, Clone)]
pub enum Signal {
    /// The program called `exit`.
    #[error("exit: {0}")]
    Exit(String),
    /// A nested session must take over input and output.
    #[error("new shell ({})", .0.type_name())]
    NewShell(Handle),
}

/// A failure raised while running a chunk.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    /// Line of the innermost statement that observed the failure.
    pub line: Option<u32>,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} (line {line})", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl From<RuntimeErrorKind> for RuntimeError {
    fn from(kind: RuntimeErrorKind) -> Self {
        RuntimeError { kind, line: None }
    }
}

/// Kind of RuntimeError.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("method not found error ({value_type} has no method `{method}`)")]
    MethodNotFound {
        value_type: ValueType,
        method: CompactString,
    },
    #[error("path error (cannot resolve `{path}`)")]
    Path { path: CompactString },
    #[error("path error (index {index} out of range for length {len})")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("immutable path error (cannot assign `{path}` into {value_type})")]
    ImmutablePath {
        path: CompactString,
        value_type: ValueType,
    },
    #[error("unexpected handle error (`{path}` crosses a host handle)")]
    UnexpectedHandle { path: CompactString },
    #[error("not callable error ({0} value is not callable)")]
    NotCallable(ValueType),
    #[error("call arguments error (takes at most {expected} arguments, but {given} were given)")]
    CallArguments { expected: usize, given: usize },
    #[error("operator error (unsupported operand type for {operator}: {operand})")]
    UnOperator {
        operator: &'static str,
        operand: ValueType,
    },
    #[error(
        "operator error (unsupported operand types for {operator}: {})",
        .operand.iter().join(" and "),
    )]
    BinOperator {
        operator: &'static str,
        operand: [ValueType; 2],
    },
    #[error("type error (cannot iterate over {0})")]
    NotIterable(ValueType),
    #[error("invalid argument error ({function}: {message})")]
    InvalidArgument {
        function: CompactString,
        message: String,
    },
    #[error("stack overflow (call depth exceeds {0})")]
    StackOverflow(usize),
    #[error("host error ({0})")]
    Host(String),
}
