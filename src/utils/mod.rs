//! Utilities for greyscript-lang.

mod float;
mod format;
mod locatable;
mod location;
mod stack;

pub use float::Float;
pub use format::{Indent, Join, format_number, quote_str};
pub use locatable::Locatable;
pub use location::{LineIndex, Location};
pub use stack::{GrowStack, ensure_sufficient_stack};
