//! Prelude for plugin crates.

pub use async_trait::async_trait;

pub use cimaise_core::error::AppError;
pub use cimaise_core::result::AppResult;
pub use cimaise_database::DatabasePool;

pub use crate::api::context::PluginContext;
pub use crate::hooks::definitions::{
    AlbumCreated, DashboardWidget, HookPoint, ImageUploaded, InitArgs, MenuItem, SettingsField,
    SettingsTab, UserLoggedIn,
};
pub use crate::hooks::registry::{DEFAULT_PRIORITY, HookRegistry};
pub use crate::traits::{Plugin, ScriptOutcome};
