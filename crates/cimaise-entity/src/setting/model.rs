//! Key/value site setting row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single site setting. Values are stored as JSON text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Setting {
    pub key: String,
    /// JSON-encoded value.
    pub value: String,
    /// Value type hint: `"string"`, `"boolean"`, `"number"`, `"json"`.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub updated_at: DateTime<Utc>,
}

impl Setting {
    /// Decode the stored value.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.value).ok()
    }
}
