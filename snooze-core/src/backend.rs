//! Backend seam over the remote story API.
//!
//! [`Session`](crate::session::Session) is written against [`StoryBackend`]
//! so the remote API can be swapped for the deterministic mock in
//! [`testing`](crate::testing).

use async_trait::async_trait;
use snooze_api::{ApiClient, AuthRecord, Error, StoryPatch, StoryPayload, StoryRecord, UserRecord};

/// The remote operations the session depends on, in wire-record terms.
#[async_trait]
pub trait StoryBackend: Send + Sync {
    async fn list_stories(&self) -> Result<Vec<StoryRecord>, Error>;

    async fn create_story(&self, token: &str, story: &StoryPayload)
        -> Result<StoryRecord, Error>;

    async fn update_story(
        &self,
        token: &str,
        story_id: &str,
        patch: &StoryPatch,
    ) -> Result<StoryRecord, Error>;

    async fn delete_story(&self, token: &str, story_id: &str) -> Result<(), Error>;

    async fn signup(&self, username: &str, password: &str, name: &str)
        -> Result<AuthRecord, Error>;

    async fn login(&self, username: &str, password: &str) -> Result<AuthRecord, Error>;

    async fn fetch_user(&self, token: &str, username: &str) -> Result<UserRecord, Error>;

    async fn add_favorite(&self, token: &str, username: &str, story_id: &str)
        -> Result<(), Error>;

    async fn remove_favorite(
        &self,
        token: &str,
        username: &str,
        story_id: &str,
    ) -> Result<(), Error>;
}

/// Production backend: delegates to the HTTP client.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: ApiClient,
}

impl RemoteBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StoryBackend for RemoteBackend {
    async fn list_stories(&self) -> Result<Vec<StoryRecord>, Error> {
        self.client.list_stories().await
    }

    async fn create_story(
        &self,
        token: &str,
        story: &StoryPayload,
    ) -> Result<StoryRecord, Error> {
        self.client.create_story(token, story).await
    }

    async fn update_story(
        &self,
        token: &str,
        story_id: &str,
        patch: &StoryPatch,
    ) -> Result<StoryRecord, Error> {
        self.client.update_story(token, story_id, patch).await
    }

    async fn delete_story(&self, token: &str, story_id: &str) -> Result<(), Error> {
        self.client.delete_story(token, story_id).await
    }

    async fn signup(
        &self,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthRecord, Error> {
        self.client.signup(username, password, name).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<AuthRecord, Error> {
        self.client.login(username, password).await
    }

    async fn fetch_user(&self, token: &str, username: &str) -> Result<UserRecord, Error> {
        self.client.fetch_user(token, username).await
    }

    async fn add_favorite(
        &self,
        token: &str,
        username: &str,
        story_id: &str,
    ) -> Result<(), Error> {
        self.client.add_favorite(token, username, story_id).await
    }

    async fn remove_favorite(
        &self,
        token: &str,
        username: &str,
        story_id: &str,
    ) -> Result<(), Error> {
        self.client.remove_favorite(token, username, story_id).await
    }
}
