//! SQLite-backed durable collection store.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::watched::WatchedEntry;

use super::{CollectionStore, StoreError};

/// The fixed key the watched collection is stored under.
const WATCHED_KEY: &str = "watched";

/// SQLite-backed key/value store holding the watched collection as a
/// single JSON record.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            -- One row per record; the watched collection lives under a
            -- fixed key as a JSON array, rewritten in full on every save.
            CREATE TABLE IF NOT EXISTS collection_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

impl CollectionStore for SqliteStore {
    fn load(&self) -> Result<Vec<WatchedEntry>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");

        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM collection_store WHERE key = ?",
                params![WATCHED_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let Some(value) = value else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&value) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // Malformed record: recover with an empty collection
                // rather than failing startup.
                warn!("Discarding unparseable watched record: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, entries: &[WatchedEntry]) -> Result<(), StoreError> {
        let value = serde_json::to_string(entries)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let conn = self.conn.lock().expect("store mutex poisoned");
        conn.execute(
            "INSERT INTO collection_store (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![WATCHED_KEY, value, Utc::now().to_rfc3339()],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}
