//! Plugin persistence entities.

pub mod model;
pub mod state;

pub use model::{NewPluginRecord, PluginRecord};
pub use state::PluginState;
