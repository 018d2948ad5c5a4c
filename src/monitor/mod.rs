//! Interception layer for ambient primitives
//!
//! Monitors wrap a primitive with a transparent observer installed on an
//! [`Ambient`] slot; observation never changes what the caller of the
//! primitive sees.

pub mod console;
pub mod hook;
pub mod network;

pub use hook::{Ambient, HookHandle};
