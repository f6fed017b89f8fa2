mod carrier;
mod password;

pub(crate) use carrier::*;
pub use password::*;
