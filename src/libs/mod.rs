//! The GreyScript intrinsics.
//!
//! Only pure functions live here. Anything touching the terminal, the clock
//! or the file system is a capability of the host.

mod builtin;
mod math;

pub use builtin::load_builtin;
pub use math::load_math;

use crate::objects::MapInner;

/// Installs every intrinsic into `api`.
pub fn load_libs(api: &MapInner) {
    load_builtin(api);
    load_math(api);
}
