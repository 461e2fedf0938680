//! libSQL-backed durable key-value storage.
//!
//! The [`Storage`] struct wraps a local libSQL database holding one JSON
//! document per key. It survives process restarts, which is what sets the
//! persisted template-listing cache apart from the in-memory content cache.
//! Through its [`CacheStore`] implementation, a record that no longer parses
//! is deleted and reported as absent.

mod migrations;

use std::path::Path;

use chrono::{DateTime, Utc};
use instructgen_shared::{CacheEntry, CacheStore, InstructGenError, Result};
use libsql::{Connection, Database, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl Storage {
    /// Open or create a database at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| InstructGenError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| InstructGenError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| InstructGenError::Storage(e.to_string()))?;

        let storage = Self { db, conn };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        InstructGenError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Raw key-value operations
    // -----------------------------------------------------------------------

    /// Get the raw JSON document stored under `key`.
    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT value_json FROM kv_cache WHERE key = ?1",
                params![key],
            )
            .await
            .map_err(|e| InstructGenError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let value: String = row
                    .get(0)
                    .map_err(|e| InstructGenError::Storage(e.to_string()))?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(InstructGenError::Storage(e.to_string())),
        }
    }

    /// Store a raw JSON document under `key` (upserts in a single statement).
    pub async fn set_value(&self, key: &str, value_json: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO kv_cache (key, value_json, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                   value_json = excluded.value_json,
                   updated_at = excluded.updated_at",
                params![key, value_json, now.as_str()],
            )
            .await
            .map_err(|e| InstructGenError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Delete the record under `key`. Deleting a missing key is not an error.
    pub async fn delete_value(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_cache WHERE key = ?1", params![key])
            .await
            .map_err(|e| InstructGenError::Storage(e.to_string()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Cache store
// ---------------------------------------------------------------------------

impl<V> CacheStore<V> for Storage
where
    V: Serialize + DeserializeOwned,
{
    async fn get(&self, key: &str) -> Result<Option<CacheEntry<V>>> {
        let Some(raw) = self.get_value(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<CacheEntry<V>>(&raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!(key, error = %e, "discarding unreadable cache record");
                self.delete_value(key).await?;
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &str, value: V, timestamp: DateTime<Utc>) -> Result<()> {
        let entry = CacheEntry::new(value, timestamp);
        let json = serde_json::to_string(&entry).map_err(|e| {
            InstructGenError::validation(format!("cache record serialization failed: {e}"))
        })?;
        self.set_value(key, &json).await?;
        debug!(key, bytes = json.len(), "cache record written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.delete_value(key).await
    }
}
