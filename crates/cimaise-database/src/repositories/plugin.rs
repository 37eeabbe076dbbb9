//! Plugin state repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use cimaise_core::error::{AppError, ErrorKind};
use cimaise_core::result::AppResult;
use cimaise_entity::plugin::{NewPluginRecord, PluginRecord};

/// Repository for the `plugins` state table.
#[derive(Debug, Clone)]
pub struct PluginRepository {
    pool: SqlitePool,
}

impl PluginRepository {
    /// Create a new plugin status repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a plugin record by slug.
    pub async fn find(&self, slug: &str) -> AppResult<Option<PluginRecord>> {
        sqlx::query_as::<_, PluginRecord>("SELECT * FROM plugins WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find plugin record", e)
            })
    }

    /// List every installed plugin, ordered by display name.
    pub async fn list_installed(&self) -> AppResult<Vec<PluginRecord>> {
        sqlx::query_as::<_, PluginRecord>("SELECT * FROM plugins ORDER BY name, slug")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list plugin records", e)
            })
    }

    /// Slugs of all active plugins, ordered by slug.
    pub async fn active_slugs(&self) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT slug FROM plugins WHERE is_active = 1 ORDER BY slug",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list active plugins", e))
    }

    /// Insert a record unless one already exists for the slug.
    ///
    /// Returns `true` when this call created the row. Concurrent installers
    /// race on the primary key; exactly one of them wins.
    pub async fn insert_if_absent(&self, record: &NewPluginRecord) -> AppResult<bool> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO plugins \
                (slug, name, version, description, author, path, is_active, installed_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(slug) DO NOTHING",
        )
        .bind(&record.slug)
        .bind(&record.name)
        .bind(&record.version)
        .bind(&record.description)
        .bind(&record.author)
        .bind(&record.path)
        .bind(record.is_active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert plugin record", e)
        })?;

        Ok(result.rows_affected() == 1)
    }

    /// Set the active flag. Returns `false` when no record exists.
    pub async fn set_active(&self, slug: &str, active: bool) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE plugins SET is_active = ?, updated_at = ? WHERE slug = ?")
                .bind(active)
                .bind(Utc::now())
                .bind(slug)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update plugin record", e)
                })?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete the record. Returns `false` when nothing was deleted.
    pub async fn delete(&self, slug: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM plugins WHERE slug = ?")
            .bind(slug)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete plugin record", e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Count installed plugins.
    pub async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plugins")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count plugin records", e)
            })?;
        Ok(count as u64)
    }

    /// Count active plugins.
    pub async fn count_active(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plugins WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count active plugins", e)
            })?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(slug: &str, name: &str) -> NewPluginRecord {
        NewPluginRecord {
            slug: slug.to_string(),
            name: name.to_string(),
            version: "1.0.0".to_string(),
            description: String::new(),
            author: String::new(),
            path: format!("./plugins/{slug}"),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn insert_is_first_writer_wins() {
        let db = crate::connect_in_memory().await.expect("db");
        let repo = PluginRepository::new(db.pool().clone());

        assert!(repo.insert_if_absent(&record("gallery", "Gallery")).await.expect("insert"));
        assert!(!repo.insert_if_absent(&record("gallery", "Other")).await.expect("insert"));

        let found = repo.find("gallery").await.expect("find").expect("row");
        assert_eq!(found.name, "Gallery");
        assert!(found.is_active);
        assert!(found.installed_at.is_some());
        assert_eq!(repo.count().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn installed_listing_is_ordered_by_name() {
        let db = crate::connect_in_memory().await.expect("db");
        let repo = PluginRepository::new(db.pool().clone());

        repo.insert_if_absent(&record("zeta", "Alpha Tools")).await.expect("insert");
        repo.insert_if_absent(&record("alpha", "Zeta Tools")).await.expect("insert");

        let names: Vec<String> = repo
            .list_installed()
            .await
            .expect("list")
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Alpha Tools", "Zeta Tools"]);
    }

    #[tokio::test]
    async fn set_active_and_delete_report_missing_rows() {
        let db = crate::connect_in_memory().await.expect("db");
        let repo = PluginRepository::new(db.pool().clone());

        assert!(!repo.set_active("ghost", true).await.expect("update"));
        assert!(!repo.delete("ghost").await.expect("delete"));

        repo.insert_if_absent(&record("seo", "SEO")).await.expect("insert");
        assert!(repo.set_active("seo", false).await.expect("update"));
        assert!(repo.active_slugs().await.expect("active").is_empty());
        assert_eq!(repo.count_active().await.expect("count"), 0);

        assert!(repo.delete("seo").await.expect("delete"));
        assert!(repo.find("seo").await.expect("find").is_none());
    }
}
