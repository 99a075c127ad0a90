//! The GreyScript Abstract Syntax Tree (AST).

mod expr;
mod function;
mod lit;
mod operator;
mod stmt;

pub use expr::*;
pub use function::*;
pub use lit::*;
pub use operator::*;
pub use stmt::*;

macro_rules! impl_locatable {
    ($name:ident) => {
        impl $crate::utils::Locatable for $name {
            fn range(&self) -> text_size::TextRange {
                self.range
            }
        }
    };
}

use impl_locatable;
