//! SQLite-backed local storage.
//!
//! Provides persistent storage for:
//! - Key-value application state (timer checkpoints live here)
//! - The last session list fetched per user, kept for offline reads

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::{data_dir, KeyValueStore};
use crate::error::{DatabaseError, Result};
use crate::session::Session;

/// The last good session fetch for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCacheEntry {
    pub sessions: Vec<Session>,
    pub fetched_at: DateTime<Utc>,
}

/// SQLite database for local state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/studysprint/studysprint.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("studysprint.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> std::result::Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS session_cache (
                user_id    TEXT PRIMARY KEY,
                payload    TEXT NOT NULL,
                fetched_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> std::result::Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> std::result::Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Delete a key from the kv store. Missing keys are not an error.
    pub fn kv_remove(&self, key: &str) -> std::result::Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Replace the cached session list for a user.
    pub fn cache_sessions(
        &self,
        user_id: &str,
        sessions: &[Session],
        fetched_at: DateTime<Utc>,
    ) -> Result<()> {
        let payload = serde_json::to_string(sessions)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO session_cache (user_id, payload, fetched_at)
             VALUES (?1, ?2, ?3)",
            params![user_id, payload, fetched_at.to_rfc3339()],
        ).map_err(DatabaseError::from)?;
        Ok(())
    }

    /// The last cached session list for a user, if any.
    pub fn cached_sessions(&self, user_id: &str) -> Result<Option<SessionCacheEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload, fetched_at FROM session_cache WHERE user_id = ?1")
            .map_err(DatabaseError::from)?;
        let row = stmt.query_row(params![user_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        });
        match row {
            Ok((payload, fetched_at)) => {
                let sessions: Vec<Session> = serde_json::from_str(&payload)?;
                let fetched_at = DateTime::parse_from_rfc3339(&fetched_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_default();
                Ok(Some(SessionCacheEntry {
                    sessions,
                    fetched_at,
                }))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::from(e).into()),
        }
    }

    /// Drop the cached session list for a user.
    pub fn clear_cached_sessions(&self, user_id: &str) -> std::result::Result<(), DatabaseError> {
        self.conn.execute(
            "DELETE FROM session_cache WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(())
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, DatabaseError> {
        self.kv_get(key)
    }

    fn set(&self, key: &str, value: &str) -> std::result::Result<(), DatabaseError> {
        self.kv_set(key, value)
    }

    fn remove(&self, key: &str) -> std::result::Result<(), DatabaseError> {
        self.kv_remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionDraft;

    fn session(id: &str, minutes: u32) -> Session {
        SessionDraft {
            user_id: "u1".into(),
            started_at: "2026-03-02T09:00:00Z".parse().unwrap(),
            minutes,
            task_id: None,
        }
        .into_session_in(id.into(), &Utc)
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_remove("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_remove("test").unwrap();
    }

    #[test]
    fn session_cache_roundtrip() {
        let db = Database::open_memory().unwrap();
        assert!(db.cached_sessions("u1").unwrap().is_none());

        let fetched_at: DateTime<Utc> = "2026-03-02T10:00:00Z".parse().unwrap();
        let sessions = vec![session("s1", 25), session("s2", 0)];
        db.cache_sessions("u1", &sessions, fetched_at).unwrap();

        let entry = db.cached_sessions("u1").unwrap().unwrap();
        assert_eq!(entry.sessions, sessions);
        assert_eq!(entry.fetched_at, fetched_at);

        // A later fetch replaces the entry wholesale.
        db.cache_sessions("u1", &sessions[..1], fetched_at).unwrap();
        let entry = db.cached_sessions("u1").unwrap().unwrap();
        assert_eq!(entry.sessions.len(), 1);

        db.clear_cached_sessions("u1").unwrap();
        assert!(db.cached_sessions("u1").unwrap().is_none());
    }

    #[test]
    fn cache_is_per_user() {
        let db = Database::open_memory().unwrap();
        let fetched_at: DateTime<Utc> = "2026-03-02T10:00:00Z".parse().unwrap();
        db.cache_sessions("alice", &[session("s1", 25)], fetched_at)
            .unwrap();
        assert!(db.cached_sessions("bob").unwrap().is_none());
    }
}
