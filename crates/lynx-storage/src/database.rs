//! SQLite-backed key-value store

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::migrations::run_migrations;
use crate::store::{KeyValueStore, Namespace};
use crate::Result;

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL keeps readers unblocked while history flushes
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }
}

impl KeyValueStore for Database {
    fn get_string(&self, namespace: Namespace, key: &str) -> Result<Option<String>> {
        self.with_connection(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv WHERE namespace = ?1 AND key = ?2",
                    [namespace.as_str(), key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    fn put_string(&self, namespace: Namespace, key: &str, value: &str) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();
        self.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO kv (namespace, key, value, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![namespace.as_str(), key, value, updated_at],
            )?;
            Ok(())
        })
    }

    fn remove(&self, namespace: Namespace, key: &str) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute(
                "DELETE FROM kv WHERE namespace = ?1 AND key = ?2",
                [namespace.as_str(), key],
            )?;
            Ok(())
        })
    }

    fn clear_namespace(&self, namespace: Namespace) -> Result<()> {
        self.with_connection(|conn| {
            let removed =
                conn.execute("DELETE FROM kv WHERE namespace = ?1", [namespace.as_str()])?;
            tracing::debug!(namespace = %namespace, removed, "Cleared namespace");
            Ok(())
        })
    }

    fn entries(&self, namespace: Namespace) -> Result<Vec<(String, String)>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT key, value FROM kv WHERE namespace = ?1 ORDER BY key",
            )?;

            let entries = stmt
                .query_map([namespace.as_str()], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<(String, String)>, _>>()?;

            Ok(entries)
        })
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        db.with_connection(|conn| {
            let count: i32 = conn.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_put_get_remove() {
        let db = Database::open_in_memory().unwrap();

        db.put_string(Namespace::Bookmarks, "https://example.com", "Example")
            .unwrap();
        db.put_string(Namespace::Bookmarks, "https://example.com", "Example Domain")
            .unwrap();

        assert_eq!(
            db.get_string(Namespace::Bookmarks, "https://example.com")
                .unwrap()
                .as_deref(),
            Some("Example Domain")
        );
        // Same key in another namespace is a different row
        assert!(db
            .get_string(Namespace::HistoryTitles, "https://example.com")
            .unwrap()
            .is_none());

        db.remove(Namespace::Bookmarks, "https://example.com").unwrap();
        assert!(db.entries(Namespace::Bookmarks).unwrap().is_empty());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lynx.db");

        {
            let db = Database::open(&path).unwrap();
            db.put_string(Namespace::HistoryOrder, "history_order", "https://a.org|https://b.org")
                .unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(
            db.get_string_or(Namespace::HistoryOrder, "history_order", "")
                .unwrap(),
            "https://a.org|https://b.org"
        );
    }
}
