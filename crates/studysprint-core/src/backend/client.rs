//! HTTP client for the REST backend.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::StoreError;
use crate::session::{Session, SessionDraft};
use crate::task::{NewTask, Task, TaskUpdate};
use crate::user::{NewUser, User};

use super::{RemoteSettings, SessionStore, SettingsStore, TaskStore, UserStore};

/// Deadline applied to every request when the config does not override it.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Client for a json-server style document store.
///
/// Every method runs under a per-request deadline; a backend that hangs
/// surfaces as [`StoreError::Timeout`] instead of stalling the caller.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let parsed = Url::parse(base_url).map_err(|err| StoreError::BaseUrl {
            url: base_url.to_string(),
            message: err.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(StoreError::BaseUrl {
                url: base_url.to_string(),
                message: "URL cannot carry path segments".to_string(),
            });
        }
        Ok(ApiClient {
            http: reqwest::Client::new(),
            base_url: parsed,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked at construction that the base can carry segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<reqwest::Response, StoreError> {
        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| StoreError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|source| StoreError::Request {
                url: url.to_string(),
                source,
            })?;
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(url.to_string())),
            status => Err(StoreError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, StoreError> {
        let response = self.send(self.http.get(url.clone()), &url).await?;
        decode(response, &url).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, StoreError> {
        let response = self.send(self.http.post(url.clone()).json(body), &url).await?;
        decode(response, &url).await
    }

    async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, StoreError> {
        let response = self
            .send(self.http.patch(url.clone()).json(body), &url)
            .await?;
        decode(response, &url).await
    }

    async fn delete(&self, url: Url) -> Result<(), StoreError> {
        self.send(self.http.delete(url.clone()), &url).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    url: &Url,
) -> Result<T, StoreError> {
    response
        .json()
        .await
        .map_err(|err| StoreError::InvalidPayload(format!("{url}: {err}")))
}

impl SessionStore for ApiClient {
    async fn list_sessions(&self, user_id: &str) -> Result<Vec<Session>, StoreError> {
        let mut url = self.endpoint(&["sessions"]);
        url.query_pairs_mut().append_pair("userId", user_id);
        self.get_json(url).await
    }

    async fn create_session(&self, draft: SessionDraft) -> Result<Session, StoreError> {
        if draft.user_id.trim().is_empty() {
            return Err(crate::error::ValidationError::InvalidValue {
                field: "userId".to_string(),
                message: "a session must belong to a user".to_string(),
            }
            .into());
        }
        // Calendar fields are derived client-side; the backend only
        // assigns the id.
        let session = draft.into_session(String::new());
        self.post_json(self.endpoint(&["sessions"]), &session).await
    }

    async fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        self.delete(self.endpoint(&["sessions", id])).await
    }
}

impl TaskStore for ApiClient {
    async fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>, StoreError> {
        let mut url = self.endpoint(&["tasks"]);
        url.query_pairs_mut().append_pair("userId", user_id);
        self.get_json(url).await
    }

    async fn create_task(&self, new_task: NewTask) -> Result<Task, StoreError> {
        new_task.validate()?;
        self.post_json(self.endpoint(&["tasks"]), &new_task).await
    }

    async fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task, StoreError> {
        self.patch_json(self.endpoint(&["tasks", id]), update).await
    }

    async fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        self.delete(self.endpoint(&["tasks", id])).await
    }
}

impl UserStore for ApiClient {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let mut url = self.endpoint(&["users"]);
        url.query_pairs_mut().append_pair("email", email);
        let users: Vec<User> = self.get_json(url).await?;
        Ok(users.into_iter().next())
    }

    async fn get_user(&self, id: &str) -> Result<User, StoreError> {
        self.get_json(self.endpoint(&["users", id])).await
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        new_user.validate()?;
        self.post_json(self.endpoint(&["users"]), &new_user).await
    }
}

impl SettingsStore for ApiClient {
    async fn fetch_settings(&self) -> Result<RemoteSettings, StoreError> {
        self.get_json(self.endpoint(&["settings"])).await
    }

    async fn save_settings(&self, settings: &RemoteSettings) -> Result<RemoteSettings, StoreError> {
        self.patch_json(self.endpoint(&["settings"]), settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unusable_base_url() {
        let err = ApiClient::new("not a url", Duration::from_secs(5));
        assert!(matches!(err, Err(StoreError::BaseUrl { .. })));
        let err = ApiClient::new("data:text/plain,hi", Duration::from_secs(5));
        assert!(matches!(err, Err(StoreError::BaseUrl { .. })));
    }

    #[test]
    fn endpoint_joins_segments_onto_base_path() {
        let client = ApiClient::new("http://localhost:3001", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.endpoint(&["sessions", "s1"]).as_str(),
            "http://localhost:3001/sessions/s1"
        );

        let nested = ApiClient::new("http://example.com/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            nested.endpoint(&["tasks"]).as_str(),
            "http://example.com/api/tasks"
        );
    }
}
