//! Concrete repositories.

pub mod plugin;
pub mod setting;

pub use plugin::PluginRepository;
pub use setting::SettingRepository;
