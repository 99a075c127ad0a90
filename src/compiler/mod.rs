//! The GreyScript compiler.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

use log::debug;

use crate::{operation::Program, utils::LineIndex};

use self::error::CompileError;

/// Compile the input source code into a runnable program.
pub fn compile(input: &str) -> Result<Program, CompileError> {
    let (chunk, errors) = parser::parse(input);
    if !errors.is_empty() {
        debug!("compile failed with {} errors", errors.len());
        return Err(errors.into());
    }
    let program = crate::operation::lower(&chunk, &LineIndex::new(input))?;
    debug!(
        "compiled {} top-level statements from {} bytes",
        program.body.steps.len(),
        input.len()
    );
    Ok(program)
}
