//! Settings Storage using SQLite

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SettingsStore,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::path::PathBuf;
use tracing::debug;

const APP_DIR: &str = "quran-hafiz";
const DB_FILE: &str = "settings.db";

/// Default on-disk location: `<data dir>/quran-hafiz/settings.db`.
pub fn default_settings_path() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR).join(DB_FILE))
        .ok_or_else(|| {
            BridgeError::NotAvailable("No platform data directory for settings".to_string())
        })
}

/// SQLite-backed settings store implementation
///
/// Plays the role `localStorage` has in the browser: a flat table of string
/// keys and string values that survives restarts.
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Create a new settings store with the given database path
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to connect to DB: {}", e)))?;

        Self::create_table(&pool).await?;
        debug!(path = ?db_path, "Initialized settings store");

        Ok(Self { pool })
    }

    /// Open the store at [`default_settings_path`].
    pub async fn open_default() -> Result<Self> {
        Self::new(default_settings_path()?).await
    }

    /// Create an in-memory settings store (for testing)
    ///
    /// Pinned to a single connection: every SQLite `:memory:` connection is its
    /// own database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to connect to DB: {}", e)))?;

        Self::create_table(&pool).await?;
        Ok(Self { pool })
    }

    async fn create_table(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| BridgeError::DatabaseError(format!("Failed to create table: {}", e)))?;
        Ok(())
    }

    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Self::now())
        .execute(&self.pool)
        .await
        .map_err(|e| BridgeError::DatabaseError(format!("Failed to set setting: {}", e)))?;

        debug!(key, bytes = value.len(), "Stored setting");
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to get setting: {}", e)))?;

        Ok(row.map(|row| row.get::<String, _>(0)))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to delete setting: {}", e)))?;

        debug!(key, "Deleted setting");
        Ok(())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to check key: {}", e)))?;

        Ok(row.is_some())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to list keys: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<String, _>(0))
            .collect())
    }

    async fn clear_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM settings")
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to clear settings: {}", e)))?;

        debug!("Cleared all settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get_string() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        store
            .set_string("quran_memorization_progress", r#"{"1":[1,2]}"#)
            .await
            .unwrap();

        let value = store
            .get_string("quran_memorization_progress")
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some(r#"{"1":[1,2]}"#));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        store.set_string("key", "first").await.unwrap();
        store.set_string("key", "second").await.unwrap();

        assert_eq!(store.get_string("key").await.unwrap().as_deref(), Some("second"));
        assert_eq!(store.list_keys().await.unwrap(), vec!["key".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        assert_eq!(store.get_string("absent").await.unwrap(), None);
        assert!(!store.has_key("absent").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        store.set_string("a", "1").await.unwrap();
        store.set_string("b", "2").await.unwrap();

        store.delete("a").await.unwrap();
        assert!(!store.has_key("a").await.unwrap());
        assert!(store.has_key("b").await.unwrap());

        store.clear_all().await.unwrap();
        assert!(store.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_persists_across_reopen() {
        let dir = std::env::temp_dir().join(format!("hafiz-settings-{}", std::process::id()));
        let path = dir.join("nested").join(DB_FILE);

        {
            let store = SqliteSettingsStore::new(path.clone()).await.unwrap();
            store.set_string("k", "v").await.unwrap();
            store.pool.close().await;
        }

        let reopened = SqliteSettingsStore::new(path).await.unwrap();
        assert_eq!(reopened.get_string("k").await.unwrap().as_deref(), Some("v"));
        reopened.pool.close().await;

        let _ = std::fs::remove_dir_all(dir);
    }
}
