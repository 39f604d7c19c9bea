//! Read-path fallback for session lists.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::session::Session;
use crate::storage::Database;

use super::SessionStore;

/// Session list plus where it came from.
#[derive(Debug, Clone)]
pub struct SessionFeed {
    pub sessions: Vec<Session>,
    /// Set when the backend was unreachable and the list came from the
    /// local cache. Empty-and-offline means nothing was cached either.
    pub offline: bool,
    /// Cache timestamp backing an offline read.
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Wraps a [`SessionStore`] with the local `session_cache` table.
///
/// Reads never fail: a successful fetch refreshes the cache, a failed
/// one logs and serves the last-known list. Writes are not proxied;
/// they go straight to the backend so a failure is never silent.
pub struct CachedSessions<'a, S> {
    backend: &'a S,
    db: &'a Database,
}

impl<'a, S: SessionStore> CachedSessions<'a, S> {
    pub fn new(backend: &'a S, db: &'a Database) -> Self {
        CachedSessions { backend, db }
    }

    /// Fetch the user's sessions, falling back to the cache when the
    /// backend is unreachable.
    pub async fn list(&self, user_id: &str, now: DateTime<Utc>) -> SessionFeed {
        match self.backend.list_sessions(user_id).await {
            Ok(sessions) => {
                if let Err(err) = self.db.cache_sessions(user_id, &sessions, now) {
                    warn!(user_id, %err, "failed to refresh session cache");
                }
                SessionFeed {
                    sessions,
                    offline: false,
                    fetched_at: None,
                }
            }
            Err(err) => {
                warn!(user_id, %err, "backend unreachable, serving cached sessions");
                match self.db.cached_sessions(user_id) {
                    Ok(Some(entry)) => SessionFeed {
                        sessions: entry.sessions,
                        offline: true,
                        fetched_at: Some(entry.fetched_at),
                    },
                    Ok(None) => SessionFeed {
                        sessions: Vec::new(),
                        offline: true,
                        fetched_at: None,
                    },
                    Err(db_err) => {
                        warn!(user_id, %db_err, "session cache unreadable");
                        SessionFeed {
                            sessions: Vec::new(),
                            offline: true,
                            fetched_at: None,
                        }
                    }
                }
            }
        }
    }
}
