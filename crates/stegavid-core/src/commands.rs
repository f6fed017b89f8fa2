//! One call per use case, the builders in [`crate::api`] do the work.

mod capacity;
mod hide;
mod unveil;

pub use capacity::*;
pub use hide::*;
pub use unveil::*;
