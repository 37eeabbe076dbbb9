//! Plugin entry point and hook wiring.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use cimaise_plugin::prelude::*;

use crate::pageview;
use crate::store::{CustomEvent, EventCount, EventStore};

pub const SLUG: &str = "analytics-logger";

pub const VERSION: &str = "1.0.0";

/// Filter over a page view record (`Map<String, Value>`, args `()`).
pub const TRACK_PAGEVIEW: &str = "analytics_track_pageview";

pub const WIDGET_ID: &str = "analytics-logger-summary";

const SUMMARY_DAYS: i64 = 7;
const SUMMARY_LIMIT: i64 = 10;

/// Buffers events raised during a request and writes them when it ends.
#[derive(Debug, Default)]
pub struct AnalyticsLoggerPlugin {
    pending: Arc<Mutex<Vec<CustomEvent>>>,
}

impl AnalyticsLoggerPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory() -> Arc<dyn Plugin> {
        Arc::new(Self::new())
    }

    /// Events tracked but not yet persisted.
    pub fn pending(&self) -> Vec<CustomEvent> {
        self.pending.lock().clone()
    }
}

#[async_trait]
impl Plugin for AnalyticsLoggerPlugin {
    async fn init(&self, ctx: &PluginContext) -> AppResult<()> {
        let summary = EventStore::new(ctx.db().pool().clone())
            .summary(SUMMARY_DAYS, SUMMARY_LIMIT)
            .await?;

        let pending = self.pending.clone();
        ctx.add_action(HookPoint::UserAfterLogin, move |login: &UserLoggedIn| {
            track(&pending, login_event(login));
            Ok(())
        });

        let pending = self.pending.clone();
        ctx.add_action(HookPoint::AlbumAfterCreate, move |album: &AlbumCreated| {
            track(&pending, album_event(album));
            Ok(())
        });

        let pending = self.pending.clone();
        ctx.add_action(HookPoint::ImageAfterUpload, move |image: &ImageUploaded| {
            track(&pending, image_event(image));
            Ok(())
        });

        ctx.add_filter(TRACK_PAGEVIEW, |data: Map<String, Value>, _: &()| {
            Ok(pageview::enhance(data))
        });

        ctx.add_filter(
            HookPoint::AdminDashboardWidgets,
            move |mut widgets: Vec<DashboardWidget>, _: &()| {
                widgets.push(summary_widget(&summary));
                Ok(widgets)
            },
        );

        info!(plugin_id = SLUG, version = VERSION, "Analytics Logger plugin initialized");
        Ok(())
    }

    fn has_install_script(&self) -> bool {
        true
    }

    async fn install(&self, db: &DatabasePool) -> AppResult<ScriptOutcome> {
        EventStore::new(db.pool().clone()).create_schema().await?;
        Ok(ScriptOutcome::ok("Analytics Logger installed, events table ready"))
    }

    fn has_uninstall_script(&self) -> bool {
        true
    }

    async fn uninstall(&self, db: &DatabasePool) -> AppResult<ScriptOutcome> {
        EventStore::new(db.pool().clone()).drop_schema().await?;
        Ok(ScriptOutcome::ok("Analytics Logger uninstalled, events table dropped"))
    }

    async fn finish(&self, db: &DatabasePool) -> AppResult<()> {
        let events = std::mem::take(&mut *self.pending.lock());
        let written = EventStore::new(db.pool().clone()).insert_all(&events).await?;
        if written > 0 {
            info!(plugin_id = SLUG, events = written, "Custom events persisted");
        }
        Ok(())
    }
}

fn track(pending: &Mutex<Vec<CustomEvent>>, event: CustomEvent) {
    debug!(plugin_id = SLUG, event_type = %event.event_type, "Custom event tracked");
    pending.lock().push(event);
}

fn login_event(login: &UserLoggedIn) -> CustomEvent {
    CustomEvent::new("user_login")
        .categorized("authentication", "login")
        .label(&login.username)
        .user(Some(login.user_id))
        .session(login.session_id.clone())
}

fn album_event(album: &AlbumCreated) -> CustomEvent {
    let label = if album.title.trim().is_empty() {
        "Untitled"
    } else {
        album.title.as_str()
    };
    CustomEvent::new("album_created")
        .categorized("content", "create_album")
        .label(label)
        .value(album.album_id)
        .user(album.user_id)
}

fn image_event(image: &ImageUploaded) -> CustomEvent {
    CustomEvent::new("image_uploaded")
        .categorized("media", "upload_image")
        .label(&image.filename)
        .value(image.image_id)
        .user(image.user_id)
        .metadata(json!({ "album_id": image.album_id }))
}

fn summary_widget(summary: &[EventCount]) -> DashboardWidget {
    DashboardWidget {
        id: WIDGET_ID.to_string(),
        title: format!("Custom Events (Last {SUMMARY_DAYS} Days)"),
        template: "analytics-logger/summary".to_string(),
        size: "half".to_string(),
        data: json!({ "events": summary }),
    }
}
