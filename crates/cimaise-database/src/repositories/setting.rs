//! Site settings repository implementation.

use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;

use cimaise_core::error::{AppError, ErrorKind};
use cimaise_core::result::AppResult;
use cimaise_entity::setting::Setting;

/// Repository for the `settings` key/value table.
#[derive(Debug, Clone)]
pub struct SettingRepository {
    pool: SqlitePool,
}

impl SettingRepository {
    /// Create a new settings repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a setting row by key.
    pub async fn find(&self, key: &str) -> AppResult<Option<Setting>> {
        sqlx::query_as::<_, Setting>("SELECT * FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find setting", e))
    }

    /// Decoded value for a key, if present and valid JSON.
    pub async fn get(&self, key: &str) -> AppResult<Option<Value>> {
        Ok(self.find(key).await?.and_then(|s| s.json()))
    }

    /// Insert or overwrite a setting.
    pub async fn set(&self, key: &str, value: &Value) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO settings (key, value, type, updated_at) VALUES (?, ?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, type = excluded.type, \
             updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value.to_string())
        .bind(type_hint(value))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save setting", e))?;
        Ok(())
    }

    /// Write a setting only when the key is not configured yet.
    ///
    /// Returns `true` when the value was written.
    pub async fn insert_if_absent(&self, key: &str, value: &Value) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO settings (key, value, type, updated_at) VALUES (?, ?, ?, ?) \
             ON CONFLICT(key) DO NOTHING",
        )
        .bind(key)
        .bind(value.to_string())
        .bind(type_hint(value))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to seed setting", e))?;
        Ok(result.rows_affected() == 1)
    }

    /// Delete the given keys. Returns the number of rows removed.
    pub async fn delete_keys(&self, keys: &[&str]) -> AppResult<u64> {
        let mut removed = 0;
        for key in keys {
            let result = sqlx::query("DELETE FROM settings WHERE key = ?")
                .bind(key)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to delete setting", e)
                })?;
            removed += result.rows_affected();
        }
        Ok(removed)
    }
}

fn type_hint(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) | Value::Null => "string",
        Value::Array(_) | Value::Object(_) => "json",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn seeding_does_not_overwrite_existing_values() {
        let db = crate::connect_in_memory().await.expect("db");
        let repo = SettingRepository::new(db.pool().clone());

        repo.set("site.title", &json!("My Portfolio")).await.expect("set");
        assert!(!repo
            .insert_if_absent("site.title", &json!("Default"))
            .await
            .expect("seed"));
        assert!(repo
            .insert_if_absent("site.enabled", &json!(true))
            .await
            .expect("seed"));

        assert_eq!(repo.get("site.title").await.expect("get"), Some(json!("My Portfolio")));
        let row = repo.find("site.enabled").await.expect("find").expect("row");
        assert_eq!(row.kind, "boolean");
    }

    #[tokio::test]
    async fn delete_keys_counts_removed_rows() {
        let db = crate::connect_in_memory().await.expect("db");
        let repo = SettingRepository::new(db.pool().clone());

        repo.set("a", &json!(1)).await.expect("set");
        repo.set("b", &json!(2)).await.expect("set");

        assert_eq!(repo.delete_keys(&["a", "b", "c"]).await.expect("delete"), 2);
        assert_eq!(repo.get("a").await.expect("get"), None);
    }
}
