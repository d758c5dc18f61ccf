//! Session - the primary public API for the story client.
//!
//! This module wraps the backend, the story store, and the signed-in user
//! into a single interface. The session is the one process-wide holder of
//! both shared resources: the store of all known stories and the current
//! user. Lifecycle: anonymous -> authenticated (signup, login, or
//! stored-credential restore) -> anonymous (logout).

use crate::backend::{RemoteBackend, StoryBackend};
use crate::store::StoryStore;
use crate::story::{NewStory, Story, StoryId, StoryUpdate};
use chrono::{DateTime, Utc};
use snooze_api::{ApiClient, AuthRecord, StoryPatch, StoryPayload, UserRecord};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from session operations. One contract for every remote-backed
/// operation; no sentinel values.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("API error: {0}")]
    Api(#[from] snooze_api::Error),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Unknown story: {0}")]
    UnknownStory(StoryId),

    #[error("Edit carries no changed fields")]
    NothingToUpdate,
}

impl SessionError {
    /// A display string for the status line, matching the messages the
    /// site shows for validation and conflict rejections.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Api(err) => match err.status() {
                Some(400) => {
                    "Error: 400. Check your inputs. Be sure to include http:// or https:// on url."
                        .to_string()
                }
                Some(409) => {
                    "Error: 409. Username already taken. Please select another.".to_string()
                }
                Some(status) => format!("Error: {status}."),
                None => format!("Error: {err}"),
            },
            other => format!("Error: {other}"),
        }
    }
}

/// The signed-in identity. At most one exists per session.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub username: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Opaque session credential, required on every mutating call.
    pub token: String,
}

/// A client session over the story API.
pub struct Session {
    backend: Box<dyn StoryBackend>,
    store: StoryStore,
    user: Option<User>,
}

impl Session {
    /// Create a session over any backend.
    pub fn new(backend: impl StoryBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            store: StoryStore::new(),
            user: None,
        }
    }

    /// Create a session over the remote HTTP API.
    pub fn remote(client: ApiClient) -> Self {
        Self::new(RemoteBackend::new(client))
    }

    /// The story store.
    pub fn store(&self) -> &StoryStore {
        &self.store
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Re-fetch the front page. No auth required.
    pub async fn refresh_stories(&mut self) -> Result<(), SessionError> {
        debug!("refreshing stories");
        let records = self.backend.list_stories().await?;
        self.store
            .replace_front_page(records.into_iter().map(Story::from).collect());
        Ok(())
    }

    /// Register a new account and sign in as it.
    ///
    /// The server answers 409 when the username is taken; the session stays
    /// anonymous in that case.
    pub async fn signup(
        &mut self,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<&User, SessionError> {
        debug!(username, "signup");
        let auth = self.backend.signup(username, password, name).await?;
        Ok(self.apply_auth(auth))
    }

    /// Sign in with an existing account.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<&User, SessionError> {
        debug!(username, "login");
        let auth = self.backend.login(username, password).await?;
        Ok(self.apply_auth(auth))
    }

    /// Revalidate a previously issued token ("remember me").
    ///
    /// Failure leaves the session anonymous; callers typically treat the
    /// error as "start logged out".
    pub async fn login_via_stored_credentials(
        &mut self,
        token: &str,
        username: &str,
    ) -> Result<&User, SessionError> {
        debug!(username, "login via stored credentials");
        let user = match self.backend.fetch_user(token, username).await {
            Ok(user) => user,
            Err(err) => {
                warn!(username, error = %err, "stored credential login failed");
                return Err(err.into());
            }
        };
        Ok(self.apply_auth(AuthRecord {
            user,
            token: token.to_string(),
        }))
    }

    /// Drop the signed-in user and their collections.
    pub fn logout(&mut self) {
        debug!("logout");
        self.user = None;
        self.store.clear_user_collections();
    }

    /// Submit a new story.
    ///
    /// On success the server-assigned story sits at index 0 of the front
    /// page and is recorded among the user's own stories.
    pub async fn add_story(&mut self, new_story: NewStory) -> Result<Story, SessionError> {
        debug!(title = %new_story.title, "add story");
        let token = self.token()?.to_string();
        let payload = StoryPayload {
            title: new_story.title,
            author: new_story.author,
            url: new_story.url,
        };

        let record = self.backend.create_story(&token, &payload).await?;
        let story = Story::from(record);
        self.store.insert_front(story.clone());
        self.store.add_own(story.id.clone());
        Ok(story)
    }

    /// Update fields of an owned story with a single request.
    ///
    /// On success the story appears exactly once, at index 0, with the
    /// updated fields.
    pub async fn edit_story(
        &mut self,
        id: &StoryId,
        update: StoryUpdate,
    ) -> Result<Story, SessionError> {
        debug!(story = %id, "edit story");
        if update.is_empty() {
            return Err(SessionError::NothingToUpdate);
        }
        let token = self.token()?.to_string();
        let patch = StoryPatch {
            title: update.title,
            author: update.author,
            url: update.url,
        };

        let record = self.backend.update_story(&token, id.as_str(), &patch).await?;
        let story = Story::from(record);
        self.store.apply_edit(story.clone());
        Ok(story)
    }

    /// Delete an owned story remotely, then remove it from every view.
    pub async fn delete_story(&mut self, id: &StoryId) -> Result<(), SessionError> {
        debug!(story = %id, "delete story");
        let token = self.token()?.to_string();
        if self.store.get(id).is_none() {
            return Err(SessionError::UnknownStory(id.clone()));
        }

        self.backend.delete_story(&token, id.as_str()).await?;
        self.store.remove(id);
        Ok(())
    }

    /// Mark a story as a favorite.
    ///
    /// The store is updated before the remote call so the UI reflects the
    /// action immediately; a remote failure rolls the store back and is
    /// returned. Favoriting an already-favorite story is a no-op.
    pub async fn add_favorite(&mut self, id: &StoryId) -> Result<(), SessionError> {
        debug!(story = %id, "add favorite");
        let (token, username) = self.credentials()?;
        if self.store.is_favorite(id) {
            return Ok(());
        }
        if !self.store.add_favorite_local(id.clone()) {
            return Err(SessionError::UnknownStory(id.clone()));
        }

        if let Err(err) = self
            .backend
            .add_favorite(&token, &username, id.as_str())
            .await
        {
            warn!(story = %id, error = %err, "favorite add failed, rolling back");
            self.store.remove_favorite_local(id);
            return Err(err.into());
        }
        Ok(())
    }

    /// Unmark a favorite, with the same rollback policy as [`add_favorite`].
    ///
    /// [`add_favorite`]: Session::add_favorite
    pub async fn remove_favorite(&mut self, id: &StoryId) -> Result<(), SessionError> {
        debug!(story = %id, "remove favorite");
        let (token, username) = self.credentials()?;
        let Some(position) = self.store.remove_favorite_local(id) else {
            return Ok(());
        };

        if let Err(err) = self
            .backend
            .remove_favorite(&token, &username, id.as_str())
            .await
        {
            warn!(story = %id, error = %err, "favorite removal failed, rolling back");
            self.store.restore_favorite_local(position, id.clone());
            return Err(err.into());
        }
        Ok(())
    }

    /// True if the story is among the user's favorites.
    pub fn is_favorite(&self, id: &StoryId) -> bool {
        self.store.is_favorite(id)
    }

    fn token(&self) -> Result<&str, SessionError> {
        self.user
            .as_ref()
            .map(|user| user.token.as_str())
            .ok_or(SessionError::NotLoggedIn)
    }

    fn credentials(&self) -> Result<(String, String), SessionError> {
        let user = self.user.as_ref().ok_or(SessionError::NotLoggedIn)?;
        Ok((user.token.clone(), user.username.clone()))
    }

    fn apply_auth(&mut self, auth: AuthRecord) -> &User {
        let AuthRecord { user, token } = auth;
        let UserRecord {
            username,
            name,
            created_at,
            favorites,
            stories,
        } = user;

        self.store.set_user_collections(
            favorites.into_iter().map(Story::from).collect(),
            stories.into_iter().map(Story::from).collect(),
        );

        self.user.insert(User {
            username,
            name,
            created_at,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16) -> SessionError {
        SessionError::Api(snooze_api::Error::Api {
            status,
            message: String::new(),
        })
    }

    #[test]
    fn test_user_message_for_validation_failure() {
        let message = api_error(400).user_message();
        assert!(message.contains("400"));
        assert!(message.contains("http:// or https://"));
    }

    #[test]
    fn test_user_message_for_taken_username() {
        let message = api_error(409).user_message();
        assert!(message.contains("already taken"));
    }

    #[test]
    fn test_user_message_generic() {
        assert_eq!(api_error(500).user_message(), "Error: 500.");
        assert_eq!(
            SessionError::NotLoggedIn.user_message(),
            "Error: Not logged in"
        );
    }
}
