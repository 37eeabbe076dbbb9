//! Hello Cimaise: a small example plugin.
//!
//! Adds an admin menu entry, a settings tab and a footer message, and logs
//! application boot and album creation.

pub mod hooks;
pub mod plugin;

pub use plugin::{HelloCimaisePlugin, SLUG};
