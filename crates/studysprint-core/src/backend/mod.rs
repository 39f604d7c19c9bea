//! Backend store abstractions.
//!
//! The REST backend is a plain json-server style document store; every
//! collection the app touches sits behind a small trait so the CLI and
//! tests can swap the HTTP client for [`MemoryBackend`] without touching
//! call sites. [`ApiClient`] implements all four traits over HTTP and
//! [`CachedSessions`] layers an offline fallback on any [`SessionStore`].

mod cache;
mod client;
mod memory;

pub use cache::{CachedSessions, SessionFeed};
pub use client::{ApiClient, DEFAULT_TIMEOUT_SECS};
pub use memory::MemoryBackend;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::session::{Session, SessionDraft};
use crate::task::{NewTask, Task, TaskUpdate};
use crate::timer::ModeDurations;
use crate::user::{NewUser, User};

fn default_theme() -> String {
    "light".to_string()
}

fn default_focus_minutes() -> u32 {
    25
}

fn default_short_break_minutes() -> u32 {
    5
}

fn default_long_break_minutes() -> u32 {
    15
}

/// The shared settings document, in the backend's wire shape.
///
/// Stored as a single object rather than a collection, so reads and
/// writes address `/settings` directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSettings {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            theme: default_theme(),
            focus_minutes: default_focus_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
        }
    }
}

impl RemoteSettings {
    /// Timer durations carried by the settings document.
    pub fn durations(&self) -> ModeDurations {
        ModeDurations {
            focus_minutes: self.focus_minutes,
            short_break_minutes: self.short_break_minutes,
            long_break_minutes: self.long_break_minutes,
        }
    }

    pub fn set_durations(&mut self, durations: ModeDurations) {
        self.focus_minutes = durations.focus_minutes;
        self.short_break_minutes = durations.short_break_minutes;
        self.long_break_minutes = durations.long_break_minutes;
    }
}

/// Store for recorded focus sessions.
#[allow(async_fn_in_trait)]
pub trait SessionStore {
    /// All sessions recorded for one user, in backend order.
    async fn list_sessions(&self, user_id: &str) -> Result<Vec<Session>, StoreError>;

    /// Materialize and persist a draft. The returned record carries the
    /// backend-assigned id.
    async fn create_session(&self, draft: SessionDraft) -> Result<Session, StoreError>;

    async fn delete_session(&self, id: &str) -> Result<(), StoreError>;
}

/// Store for study tasks.
#[allow(async_fn_in_trait)]
pub trait TaskStore {
    async fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>, StoreError>;

    async fn create_task(&self, new_task: NewTask) -> Result<Task, StoreError>;

    /// Apply a partial update and return the patched record.
    async fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task, StoreError>;

    async fn delete_task(&self, id: &str) -> Result<(), StoreError>;
}

/// Store for user accounts.
#[allow(async_fn_in_trait)]
pub trait UserStore {
    /// Exact-match lookup; `None` when no account uses the address.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn get_user(&self, id: &str) -> Result<User, StoreError>;

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError>;
}

/// Store for the shared settings document.
#[allow(async_fn_in_trait)]
pub trait SettingsStore {
    async fn fetch_settings(&self) -> Result<RemoteSettings, StoreError>;

    /// Patch the document and return the backend's copy.
    async fn save_settings(&self, settings: &RemoteSettings) -> Result<RemoteSettings, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_wire_format_is_camel_case() {
        let settings = RemoteSettings {
            theme: "dark".into(),
            focus_minutes: 50,
            short_break_minutes: 10,
            long_break_minutes: 20,
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "theme": "dark",
                "focusMinutes": 50,
                "shortBreakMinutes": 10,
                "longBreakMinutes": 20,
            })
        );
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let settings: RemoteSettings = serde_json::from_value(serde_json::json!({
            "theme": "dark",
        }))
        .unwrap();
        assert_eq!(settings.focus_minutes, 25);
        assert_eq!(settings.short_break_minutes, 5);
        assert_eq!(settings.long_break_minutes, 15);
    }

    #[test]
    fn durations_round_trip_through_settings() {
        let mut settings = RemoteSettings::default();
        settings.set_durations(ModeDurations {
            focus_minutes: 45,
            short_break_minutes: 7,
            long_break_minutes: 25,
        });
        assert_eq!(settings.durations().focus_minutes, 45);
        assert_eq!(settings.theme, "light");
    }
}
