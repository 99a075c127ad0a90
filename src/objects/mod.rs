//! The GreyScript values.

mod callback;
mod conversion;
mod function;
mod handle;
mod list;
mod map;
mod methods;
mod string;
mod value;

pub use callback::*;
pub use conversion::*;
pub use function::*;
pub use handle::*;
pub use list::*;
pub use map::*;
pub use methods::BuiltinMethods;
pub(crate) use methods::{Args, resolve_index, slice_bounds, value_to_index};
pub(crate) use string::{char_at, slice as slice_str};
pub use value::*;
