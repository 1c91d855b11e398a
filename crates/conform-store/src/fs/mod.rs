//! Filesystem primitives shared by the stores.

mod atomic;
mod layout;

pub use atomic::atomic_write;
pub use layout::{checked_join, validate_segment};
