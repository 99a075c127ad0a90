//! GreyScript front end and tree-walking runtime.
//!
//! ```txt
//!        +-------+             +--------+          +-------+
//! str -> | lexer | - Tokens -> | parser | - AST -> | lower |
//!        +-------+             +--------+          +-------+
//!                                                      |
//!             +------------- Program ------------------+
//!             |
//!             v
//!        +-------------+            +---------------------------+
//!        | Interpreter | - fork  -> | OperationContext chain    |
//!        +-------------+            | (scopes, control records) |
//!                                   +---------------------------+
//! ```
//!
//! # Examples
//!
//! ```rust
//! use greyscript_lang::{Completion, Interpreter, Value};
//!
//! let interpreter = Interpreter::new();
//! let input = r#"
//! f = function(a)
//!     return a + 1
//! end function
//! return f(41)
//! "#;
//! let completion = futures::executor::block_on(interpreter.run_source(input, Vec::new()));
//! match completion.unwrap() {
//!     Completion::Done(value) => assert_eq!(value, Value::from(42)),
//!     other => panic!("unexpected completion {other:?}"),
//! }
//! ```

// Pedantic warnings
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines, clippy::must_use_candidate)]
// TODO: Improve documentation
#![allow(
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::future_not_send,
    clippy::float_cmp
)]

pub mod collector;
pub mod compiler;
pub mod context;
pub mod errors;
pub mod interpreter;
pub mod libs;
pub mod objects;
pub mod operation;
pub mod utils;

pub use errors::{Error, RuntimeError, RuntimeErrorKind, Signal};
pub use interpreter::{Completion, Interpreter, Options, RunError};
pub use objects::{CallbackInner, CallbackReturn, HandleInner, HostObject, Value, ValueType};
