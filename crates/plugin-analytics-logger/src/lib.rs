//! Analytics logger plugin for Cimaise.
//!
//! Records content and authentication events into its own
//! `plugin_analytics_custom_events` table, enriches page views, and shows a
//! weekly summary on the admin dashboard.

pub mod pageview;
pub mod plugin;
pub mod store;

pub use plugin::{AnalyticsLoggerPlugin, SLUG, TRACK_PAGEVIEW};
pub use store::{CustomEvent, EventCount, EventStore};
