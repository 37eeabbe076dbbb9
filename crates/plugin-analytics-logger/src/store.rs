//! Persistence for custom events.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;

use cimaise_core::error::{AppError, ErrorKind};
use cimaise_core::result::AppResult;

pub const TABLE: &str = "plugin_analytics_custom_events";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS plugin_analytics_custom_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT,
    event_type TEXT NOT NULL,
    event_category TEXT,
    event_action TEXT,
    event_label TEXT,
    event_value INTEGER,
    user_id INTEGER,
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL
)";

const CREATE_INDEXES: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS idx_custom_events_session ON plugin_analytics_custom_events(session_id)",
    "CREATE INDEX IF NOT EXISTS idx_custom_events_type ON plugin_analytics_custom_events(event_type)",
];

/// A tracked event, buffered in memory until the request finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEvent {
    pub session_id: Option<String>,
    pub event_type: String,
    pub category: Option<String>,
    pub action: Option<String>,
    pub label: Option<String>,
    pub value: Option<i64>,
    pub user_id: Option<i64>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl CustomEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            session_id: None,
            event_type: event_type.into(),
            category: None,
            action: None,
            label: None,
            value: None,
            user_id: None,
            metadata: Value::Object(Default::default()),
            created_at: Utc::now(),
        }
    }

    pub fn categorized(mut self, category: &str, action: &str) -> Self {
        self.category = Some(category.to_string());
        self.action = Some(action.to_string());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn user(mut self, user_id: Option<i64>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn session(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Number of events of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventCount {
    pub event_type: String,
    pub count: i64,
}

/// Access to the plugin-owned events table.
#[derive(Debug, Clone)]
pub struct EventStore {
    pool: SqlitePool,
}

impl EventStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the table and its indexes if missing.
    pub async fn create_schema(&self) -> AppResult<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create events table", e))?;

        for statement in CREATE_INDEXES {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create events index", e))?;
        }
        Ok(())
    }

    pub async fn drop_schema(&self) -> AppResult<()> {
        sqlx::query("DROP TABLE IF EXISTS plugin_analytics_custom_events")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to drop events table", e))?;
        Ok(())
    }

    /// Write events in one transaction. Returns the number written.
    pub async fn insert_all(&self, events: &[CustomEvent]) -> AppResult<usize> {
        if events.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e))?;

        for event in events {
            sqlx::query(
                "INSERT INTO plugin_analytics_custom_events \
                 (session_id, event_type, event_category, event_action, event_label, event_value, user_id, metadata, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&event.session_id)
            .bind(&event.event_type)
            .bind(&event.category)
            .bind(&event.action)
            .bind(&event.label)
            .bind(event.value)
            .bind(event.user_id)
            .bind(event.metadata.to_string())
            .bind(event.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to log custom event", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit custom events", e))?;
        Ok(events.len())
    }

    /// Top event types over the last `days` days, most frequent first.
    pub async fn summary(&self, days: i64, limit: i64) -> AppResult<Vec<EventCount>> {
        let since = Utc::now() - Duration::days(days);
        sqlx::query_as::<_, EventCount>(
            "SELECT event_type, COUNT(*) AS count FROM plugin_analytics_custom_events \
             WHERE created_at >= ? GROUP BY event_type ORDER BY count DESC, event_type LIMIT ?",
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to summarise custom events", e))
    }

    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM plugin_analytics_custom_events")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count custom events", e))
    }

    pub async fn table_exists(&self) -> AppResult<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(TABLE)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to inspect schema", e))?;
        Ok(found > 0)
    }
}
