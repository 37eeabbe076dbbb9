//! # cimaise-plugin
//!
//! The extensibility kernel for Cimaise. Provides:
//!
//! - Hook registry with actions and filters, ordered by priority then
//!   registration sequence, with per-callback failure isolation
//! - Manifest parsing of plugin bundle header blocks
//! - Plugin loader that discovers bundles and loads the active set
//! - Lifecycle manager for install, activate, deactivate and uninstall
//! - Read-only diagnostics over the registry and persisted state
//! - Per-request bootstrap (`PluginKernel` / `RequestScope`)

pub mod api;
pub mod bootstrap;
pub mod diagnostics;
pub mod error;
pub mod hooks;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod prelude;
pub mod registry;
pub mod traits;

pub use api::context::PluginContext;
pub use bootstrap::{PluginKernel, RequestScope};
pub use diagnostics::{Diagnostics, DiagnosticsReport};
pub use error::PluginError;
pub use hooks::definitions::HookPoint;
pub use hooks::registry::{DEFAULT_PRIORITY, HookId, HookKind, HookRegistry};
pub use loader::{LoadedPlugin, PluginLoader};
pub use manager::{LifecycleManager, LifecycleOutcome, PluginListing, PluginStats};
pub use manifest::PluginManifest;
pub use registry::PluginFactoryRegistry;
pub use traits::{Plugin, ScriptOutcome};
