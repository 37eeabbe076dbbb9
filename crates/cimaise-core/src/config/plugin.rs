//! Plugin system configuration.

use serde::{Deserialize, Serialize};

/// Plugin system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Directory containing one sub-directory per plugin bundle.
    #[serde(default = "default_plugin_directory")]
    pub directory: String,
    /// File inside each bundle that carries the manifest header.
    #[serde(default = "default_entry_file")]
    pub entry_file: String,
    /// Whether active plugins are loaded at the start of each request.
    /// Turning this off boots with an empty registry.
    #[serde(default = "default_true")]
    pub auto_load: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            directory: default_plugin_directory(),
            entry_file: default_entry_file(),
            auto_load: true,
        }
    }
}

fn default_plugin_directory() -> String {
    "./plugins".to_string()
}

fn default_entry_file() -> String {
    "plugin.manifest".to_string()
}

fn default_true() -> bool {
    true
}
