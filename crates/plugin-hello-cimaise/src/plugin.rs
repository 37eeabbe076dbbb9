//! Plugin entry point.

use std::collections::BTreeMap;
use std::sync::Arc;

use cimaise_plugin::prelude::*;

use crate::hooks;

/// Bundle directory name.
pub const SLUG: &str = "hello-cimaise";

pub const VERSION: &str = "1.0.0";

/// The Hello Cimaise plugin. Stateless; all behaviour lives in its hooks.
#[derive(Debug, Default)]
pub struct HelloCimaisePlugin;

impl HelloCimaisePlugin {
    pub fn new() -> Self {
        Self
    }

    /// Factory for the plugin registry.
    pub fn factory() -> Arc<dyn Plugin> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl Plugin for HelloCimaisePlugin {
    async fn init(&self, ctx: &PluginContext) -> AppResult<()> {
        let registry = Arc::downgrade(ctx.hooks());
        ctx.add_action(HookPoint::CimaiseInit, move |args: &InitArgs| {
            hooks::on_app_init(args, registry.upgrade().as_deref());
            Ok(())
        });
        ctx.add_filter(HookPoint::AdminMenuItems, |items: Vec<MenuItem>, _: &()| {
            Ok(hooks::add_menu_item(items))
        });
        ctx.add_filter(
            HookPoint::SettingsTabs,
            |tabs: BTreeMap<String, SettingsTab>, _: &()| Ok(hooks::add_settings_tab(tabs)),
        );
        ctx.add_action(HookPoint::AlbumAfterCreate, |album: &AlbumCreated| {
            hooks::log_album_creation(album);
            Ok(())
        });
        ctx.add_filter(HookPoint::FooterContent, |html: String, _: &()| {
            Ok(hooks::add_footer_message(html))
        });

        tracing::info!(plugin_id = SLUG, version = VERSION, "Hello Cimaise plugin initialized");
        Ok(())
    }
}
