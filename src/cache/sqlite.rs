//! sqlite-backed [`CacheBackend`].
//!
//! One table, one row per request URL. Headers are stored as a JSON array
//! of `[name, value]` pairs, timestamps as milliseconds since the epoch.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};

use super::response::{CacheBackend, CachedResponse};
use crate::{EnmetError, Result};

/// Persistent response store.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    EnmetError::Cache(format!(
                        "failed to create cache dir {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    /// Database living only as long as this backend.
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS responses (
                key TEXT PRIMARY KEY,
                url TEXT NOT NULL,
                status INTEGER NOT NULL,
                headers TEXT NOT NULL,
                body TEXT NOT NULL,
                fetched_at INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn to_millis(at: SystemTime) -> i64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn from_millis(millis: i64) -> SystemTime {
    UNIX_EPOCH + Duration::from_millis(u64::try_from(millis).unwrap_or(0))
}

impl CacheBackend for SqliteBackend {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn get(&self, key: &str) -> Result<Option<CachedResponse>> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT url, status, headers, body, fetched_at FROM responses WHERE key = ?1",
                params![key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u16>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((url, status, headers, body, fetched_at)) = row else {
            return Ok(None);
        };
        Ok(Some(CachedResponse {
            url,
            status,
            headers: serde_json::from_str(&headers)?,
            body,
            fetched_at: from_millis(fetched_at),
        }))
    }

    fn insert(&self, key: &str, response: &CachedResponse) -> Result<()> {
        let headers = serde_json::to_string(&response.headers)?;
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO responses (key, url, status, headers, body, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                key,
                response.url,
                response.status,
                headers,
                response.body,
                to_millis(response.fetched_at)
            ],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .lock()
            .execute("DELETE FROM responses WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.conn.lock().execute("DELETE FROM responses", [])?;
        Ok(())
    }

    fn len(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(body: &str) -> CachedResponse {
        CachedResponse {
            url: "https://www.metal-archives.com/bands/_/138".into(),
            status: 200,
            headers: vec![("content-type".into(), "text/html; charset=UTF-8".into())],
            body: body.into(),
            fetched_at: from_millis(1_700_000_000_000),
        }
    }

    #[test]
    fn stores_and_reads_back_every_column() {
        let backend = SqliteBackend::in_memory().unwrap();
        backend.insert("k", &sample("<html/>")).unwrap();
        assert_eq!(backend.get("k").unwrap(), Some(sample("<html/>")));
    }

    #[test]
    fn insert_replaces_existing_key() {
        let backend = SqliteBackend::in_memory().unwrap();
        backend.insert("k", &sample("old")).unwrap();
        backend.insert("k", &sample("new")).unwrap();
        assert_eq!(backend.get("k").unwrap().unwrap().body, "new");
        assert_eq!(backend.len().unwrap(), 1);
    }

    #[test]
    fn remove_and_clear() {
        let backend = SqliteBackend::in_memory().unwrap();
        backend.insert("a", &sample("a")).unwrap();
        backend.insert("b", &sample("b")).unwrap();
        backend.remove("a").unwrap();
        assert!(backend.get("a").unwrap().is_none());
        backend.clear().unwrap();
        assert!(backend.is_empty().unwrap());
    }

    #[test]
    fn persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.sqlite");
        SqliteBackend::open(&path)
            .unwrap()
            .insert("k", &sample("kept"))
            .unwrap();

        let reopened = SqliteBackend::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().unwrap().body, "kept");
    }
}
