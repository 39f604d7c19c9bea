//! In-memory backend for tests and offline use.

use std::sync::Mutex;

use uuid::Uuid;

use crate::error::StoreError;
use crate::session::{Session, SessionDraft};
use crate::task::{NewTask, Task, TaskUpdate};
use crate::user::{NewUser, User};

use super::{RemoteSettings, SessionStore, SettingsStore, TaskStore, UserStore};

#[derive(Debug, Default)]
struct State {
    sessions: Vec<Session>,
    tasks: Vec<Task>,
    users: Vec<User>,
    settings: RemoteSettings,
}

/// Store that keeps every collection in process memory.
///
/// Mirrors the HTTP contract, including id assignment and 404-style
/// `NotFound` errors, so trait consumers behave the same against either.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }

    fn next_id() -> String {
        Uuid::new_v4().to_string()
    }
}

impl SessionStore for MemoryBackend {
    async fn list_sessions(&self, user_id: &str) -> Result<Vec<Session>, StoreError> {
        let state = self.state();
        Ok(state
            .sessions
            .iter()
            .filter(|session| session.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_session(&self, draft: SessionDraft) -> Result<Session, StoreError> {
        if draft.user_id.trim().is_empty() {
            return Err(crate::error::ValidationError::InvalidValue {
                field: "userId".to_string(),
                message: "a session must belong to a user".to_string(),
            }
            .into());
        }
        let session = draft.into_session(Self::next_id());
        self.state().sessions.push(session.clone());
        Ok(session)
    }

    async fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        let mut state = self.state();
        let before = state.sessions.len();
        state.sessions.retain(|session| session.id != id);
        if state.sessions.len() == before {
            return Err(StoreError::NotFound(format!("sessions/{id}")));
        }
        Ok(())
    }
}

impl TaskStore for MemoryBackend {
    async fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>, StoreError> {
        let state = self.state();
        Ok(state
            .tasks
            .iter()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_task(&self, new_task: NewTask) -> Result<Task, StoreError> {
        new_task.validate()?;
        let task = Task {
            id: Self::next_id(),
            user_id: new_task.user_id,
            title: new_task.title,
            subject: new_task.subject,
            due_date: new_task.due_date,
            priority: new_task.priority,
            status: new_task.status,
        };
        self.state().tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task, StoreError> {
        let mut state = self.state();
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("tasks/{id}")))?;
        update.apply_to(task);
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        let mut state = self.state();
        let before = state.tasks.len();
        state.tasks.retain(|task| task.id != id);
        if state.tasks.len() == before {
            return Err(StoreError::NotFound(format!("tasks/{id}")));
        }
        Ok(())
    }
}

impl UserStore for MemoryBackend {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state();
        Ok(state.users.iter().find(|user| user.email == email).cloned())
    }

    async fn get_user(&self, id: &str) -> Result<User, StoreError> {
        let state = self.state();
        state
            .users
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("users/{id}")))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        new_user.validate()?;
        let user = User {
            id: Self::next_id(),
            name: new_user.name,
            email: new_user.email,
        };
        self.state().users.push(user.clone());
        Ok(user)
    }
}

impl SettingsStore for MemoryBackend {
    async fn fetch_settings(&self) -> Result<RemoteSettings, StoreError> {
        Ok(self.state().settings.clone())
    }

    async fn save_settings(&self, settings: &RemoteSettings) -> Result<RemoteSettings, StoreError> {
        let mut state = self.state();
        state.settings = settings.clone();
        Ok(state.settings.clone())
    }
}
