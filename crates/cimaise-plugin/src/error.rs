//! Error taxonomy of the plugin kernel.
//!
//! Manifest, load and callback errors are recovered where they happen and
//! only logged. Lifecycle script errors are surfaced to the caller.

use std::any::Any;

use thiserror::Error;

use cimaise_core::error::{AppError, ErrorKind};

/// Errors raised by the plugin kernel.
#[derive(Debug, Clone, Error)]
pub enum PluginError {
    /// A bundle's header block is unreadable or lacks `Plugin Name`.
    #[error("invalid manifest at {path}: {message}")]
    ManifestParse { path: String, message: String },

    /// A plugin failed while registering itself for the current request.
    #[error("plugin '{slug}' failed to load: {message}")]
    Load { slug: String, message: String },

    /// A registered action or filter callback failed.
    #[error("hook '{hook}' callback from plugin '{plugin_id}' failed: {message}")]
    HookCallback {
        hook: String,
        plugin_id: String,
        message: String,
    },

    /// An install or uninstall script reported failure.
    #[error("{script} script of plugin '{slug}' failed: {message}")]
    LifecycleScript {
        slug: String,
        script: &'static str,
        message: String,
    },

    /// No bundle with this slug exists in the plugins directory.
    #[error("plugin '{slug}' not found")]
    NotFound { slug: String },

    /// The operation requires an installed plugin.
    #[error("plugin '{slug}' is not installed")]
    NotInstalled { slug: String },

    /// A bundle exists on disk but no implementation is compiled in for it.
    #[error("no implementation registered for plugin '{slug}'")]
    MissingFactory { slug: String },
}

impl From<PluginError> for AppError {
    fn from(err: PluginError) -> Self {
        let kind = match &err {
            PluginError::NotFound { .. } | PluginError::MissingFactory { .. } => {
                ErrorKind::NotFound
            }
            PluginError::NotInstalled { .. } => ErrorKind::Validation,
            _ => ErrorKind::Plugin,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}

/// Render a caught panic payload as a message.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_errors_map_to_plugin_kind() {
        let err: AppError = PluginError::LifecycleScript {
            slug: "seo".into(),
            script: "install",
            message: "disk full".into(),
        }
        .into();
        assert_eq!(err.kind, ErrorKind::Plugin);
        assert!(err.message.contains("install script of plugin 'seo' failed"));
    }

    #[test]
    fn not_installed_is_a_validation_error() {
        let err: AppError = PluginError::NotInstalled { slug: "seo".into() }.into();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn panic_payloads_are_rendered() {
        let caught = std::panic::catch_unwind(|| panic!("boom {}", 1)).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "boom 1");

        let caught = std::panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "static");
    }
}
