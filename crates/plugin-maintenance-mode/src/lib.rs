//! Maintenance mode plugin for Cimaise.
//!
//! While enabled, visitors get a maintenance page instead of the site,
//! search engines are told not to index, and admins keep full access.
//! Settings live in the shared `settings` table under `maintenance.*`.

pub mod gate;
pub mod plugin;
pub mod settings;

pub use gate::should_show_maintenance_page;
pub use plugin::{MaintenanceModePlugin, SLUG};
pub use settings::{MaintenancePage, MaintenanceSettings};
