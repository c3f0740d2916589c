//! SQLite-backed key-value store.

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::kv_backend::{KeyValueStore, KvResult};

/// SQLite key-value store: a single `kv(key, value)` table.
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
}

impl SqliteKvStore {
    /// Open (or create) the store at the given path.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        tracing::debug!("Opened history database at {}", path.as_ref().display());
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn.lock().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Number of stored keys.
    #[cfg(test)]
    pub fn count(&self) -> KvResult<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .lock()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        self.conn.lock().execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        self.conn
            .lock()
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_get_missing_key() {
        let store = SqliteKvStore::in_memory().unwrap();
        assert_eq!(store.get("lastCity").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let store = SqliteKvStore::in_memory().unwrap();
        store.set("lastCity", "Lon").unwrap();
        store.set("lastCity", "Paris").unwrap();

        assert_eq!(store.get("lastCity").unwrap().as_deref(), Some("Paris"));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_remove() {
        let store = SqliteKvStore::in_memory().unwrap();
        store.set("recentSearches", "[]").unwrap();
        store.remove("recentSearches").unwrap();
        // Absent key is fine
        store.remove("recentSearches").unwrap();

        assert_eq!(store.get("recentSearches").unwrap(), None);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("skyfetch.db");

        {
            let store = SqliteKvStore::open(&path).unwrap();
            store.set("lastCity", "Tokyo").unwrap();
        }

        let store = SqliteKvStore::open(&path).unwrap();
        assert_eq!(store.get("lastCity").unwrap().as_deref(), Some("Tokyo"));
    }

    #[test]
    fn test_open_in_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no/such/dir/skyfetch.db");
        assert!(SqliteKvStore::open(&path).is_err());
    }
}
