mod config;
pub mod database;

pub use config::Config;
pub use database::{Database, SessionCacheEntry};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::DatabaseError;

/// Returns `~/.config/studysprint[-dev]/` based on STUDYSPRINT_ENV.
///
/// Set STUDYSPRINT_ENV=dev to use a development data directory, or
/// STUDYSPRINT_DATA_DIR to point somewhere else entirely (tests do).
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> std::io::Result<PathBuf> {
    if let Ok(dir) = std::env::var("STUDYSPRINT_DATA_DIR") {
        if !dir.is_empty() {
            let dir = PathBuf::from(dir);
            std::fs::create_dir_all(&dir)?;
            return Ok(dir);
        }
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STUDYSPRINT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("studysprint-dev")
    } else {
        base_dir.join("studysprint")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Minimal string key-value persistence, the surface timer checkpoints
/// are written through. [`Database`] backs it with SQLite; [`MemoryKv`]
/// keeps everything in a map for tests and embedding.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError>;
    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError>;
    fn remove(&self, key: &str) -> Result<(), DatabaseError>;
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DatabaseError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}
