//! Testing utilities for the story client.
//!
//! This module provides tools for integration testing:
//! - [`MockBackend`] for deterministic testing without HTTP calls
//! - [`TestHarness`] for scripted session scenarios
//! - Assertion helpers for verifying store state
//!
//! The mock plays the server's role: it assigns ids, enforces the token and
//! conflict rules of the remote contract, and keeps a log of the calls each
//! operation produced.

use crate::backend::StoryBackend;
use crate::session::Session;
use crate::story::StoryId;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use snooze_api::{AuthRecord, Error, StoryPatch, StoryPayload, StoryRecord, UserRecord};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// A scripted in-memory stand-in for the remote API.
///
/// Cloning yields another handle onto the same state, so tests can keep one
/// handle for seeding and inspection while the session owns the other.
#[derive(Clone, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    stories: Vec<StoryRecord>,
    users: HashMap<String, MockUser>,
    next_story: u32,
    forced_errors: VecDeque<Error>,
    calls: Vec<String>,
}

struct MockUser {
    name: String,
    password: String,
    token: String,
    created_at: DateTime<Utc>,
    favorite_ids: Vec<String>,
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().expect("mock backend state poisoned")
    }

    /// Seed a story as if some user had already submitted it. Returns the
    /// record with its assigned id.
    pub fn seed_story(&self, title: &str, author: &str, url: &str, username: &str) -> StoryRecord {
        let mut state = self.state();
        let record = state.assign_story(title, author, url, username);
        state.stories.insert(0, record.clone());
        record
    }

    /// Register a user without going through signup. Returns the token the
    /// mock will accept for that user.
    pub fn seed_user(&self, username: &str, password: &str, name: &str) -> String {
        let token = format!("token-{username}");
        self.state().users.insert(
            username.to_string(),
            MockUser {
                name: name.to_string(),
                password: password.to_string(),
                token: token.clone(),
                created_at: base_time(),
                favorite_ids: Vec::new(),
            },
        );
        token
    }

    /// Make the next call fail with the given error.
    pub fn fail_next(&self, error: Error) {
        self.state().forced_errors.push_back(error);
    }

    /// Make the next call fail with an HTTP status rejection.
    pub fn fail_next_status(&self, status: u16) {
        self.fail_next(Error::Api {
            status,
            message: String::new(),
        });
    }

    /// Make the next call fail as if the network dropped.
    pub fn fail_next_network(&self) {
        self.fail_next(Error::Network("connection reset".to_string()));
    }

    /// Names of every backend call made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Number of stories the mock server currently holds.
    pub fn story_count(&self) -> usize {
        self.state().stories.len()
    }

    fn begin(&self, call: &str) -> Result<MutexGuard<'_, MockState>, Error> {
        let mut state = self.state();
        state.calls.push(call.to_string());
        if let Some(error) = state.forced_errors.pop_front() {
            return Err(error);
        }
        Ok(state)
    }
}

impl MockState {
    fn assign_story(&mut self, title: &str, author: &str, url: &str, username: &str) -> StoryRecord {
        let n = self.next_story;
        self.next_story += 1;
        StoryRecord {
            story_id: format!("story-{n}"),
            title: title.to_string(),
            author: author.to_string(),
            url: url.to_string(),
            username: username.to_string(),
            created_at: base_time() + Duration::seconds(i64::from(n)),
        }
    }

    fn username_for_token(&self, token: &str) -> Result<String, Error> {
        self.users
            .iter()
            .find(|(_, user)| user.token == token)
            .map(|(username, _)| username.clone())
            .ok_or(Error::Api {
                status: 401,
                message: "invalid token".to_string(),
            })
    }

    fn user_record(&self, username: &str) -> Result<UserRecord, Error> {
        let user = self.users.get(username).ok_or(Error::Api {
            status: 404,
            message: "no such user".to_string(),
        })?;

        let favorites = user
            .favorite_ids
            .iter()
            .filter_map(|id| self.stories.iter().find(|s| &s.story_id == id))
            .cloned()
            .collect();
        let stories = self
            .stories
            .iter()
            .filter(|s| s.username == username)
            .cloned()
            .collect();

        Ok(UserRecord {
            username: username.to_string(),
            name: user.name.clone(),
            created_at: user.created_at,
            favorites,
            stories,
        })
    }
}

#[async_trait]
impl StoryBackend for MockBackend {
    async fn list_stories(&self) -> Result<Vec<StoryRecord>, Error> {
        let state = self.begin("list_stories")?;
        Ok(state.stories.clone())
    }

    async fn create_story(
        &self,
        token: &str,
        story: &StoryPayload,
    ) -> Result<StoryRecord, Error> {
        let mut state = self.begin("create_story")?;
        let username = state.username_for_token(token)?;
        if !story.url.starts_with("http://") && !story.url.starts_with("https://") {
            return Err(Error::Api {
                status: 400,
                message: "url must be http(s)".to_string(),
            });
        }

        let record = state.assign_story(&story.title, &story.author, &story.url, &username);
        state.stories.insert(0, record.clone());
        Ok(record)
    }

    async fn update_story(
        &self,
        token: &str,
        story_id: &str,
        patch: &StoryPatch,
    ) -> Result<StoryRecord, Error> {
        let mut state = self.begin("update_story")?;
        state.username_for_token(token)?;

        let story = state
            .stories
            .iter_mut()
            .find(|s| s.story_id == story_id)
            .ok_or(Error::Api {
                status: 404,
                message: "no such story".to_string(),
            })?;

        if let Some(title) = &patch.title {
            story.title = title.clone();
        }
        if let Some(author) = &patch.author {
            story.author = author.clone();
        }
        if let Some(url) = &patch.url {
            story.url = url.clone();
        }
        Ok(story.clone())
    }

    async fn delete_story(&self, token: &str, story_id: &str) -> Result<(), Error> {
        let mut state = self.begin("delete_story")?;
        state.username_for_token(token)?;

        let before = state.stories.len();
        state.stories.retain(|s| s.story_id != story_id);
        if state.stories.len() == before {
            return Err(Error::Api {
                status: 404,
                message: "no such story".to_string(),
            });
        }
        for user in state.users.values_mut() {
            user.favorite_ids.retain(|id| id != story_id);
        }
        Ok(())
    }

    async fn signup(
        &self,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthRecord, Error> {
        let mut state = self.begin("signup")?;
        if state.users.contains_key(username) {
            return Err(Error::Api {
                status: 409,
                message: "username taken".to_string(),
            });
        }

        let token = format!("token-{username}");
        state.users.insert(
            username.to_string(),
            MockUser {
                name: name.to_string(),
                password: password.to_string(),
                token: token.clone(),
                created_at: base_time(),
                favorite_ids: Vec::new(),
            },
        );

        let user = state.user_record(username)?;
        Ok(AuthRecord { user, token })
    }

    async fn login(&self, username: &str, password: &str) -> Result<AuthRecord, Error> {
        let state = self.begin("login")?;
        let user = state.users.get(username).ok_or(Error::Api {
            status: 404,
            message: "no such user".to_string(),
        })?;
        if user.password != password {
            return Err(Error::Api {
                status: 401,
                message: "bad password".to_string(),
            });
        }

        let token = user.token.clone();
        let user = state.user_record(username)?;
        Ok(AuthRecord { user, token })
    }

    async fn fetch_user(&self, token: &str, username: &str) -> Result<UserRecord, Error> {
        let state = self.begin("fetch_user")?;
        let token_owner = state.username_for_token(token)?;
        if token_owner != username {
            return Err(Error::Api {
                status: 401,
                message: "token does not match user".to_string(),
            });
        }
        state.user_record(username)
    }

    async fn add_favorite(
        &self,
        token: &str,
        username: &str,
        story_id: &str,
    ) -> Result<(), Error> {
        let mut state = self.begin("add_favorite")?;
        state.username_for_token(token)?;

        let story_id = story_id.to_string();
        let user = state.users.get_mut(username).ok_or(Error::Api {
            status: 404,
            message: "no such user".to_string(),
        })?;
        if !user.favorite_ids.contains(&story_id) {
            user.favorite_ids.push(story_id);
        }
        Ok(())
    }

    async fn remove_favorite(
        &self,
        token: &str,
        username: &str,
        story_id: &str,
    ) -> Result<(), Error> {
        let mut state = self.begin("remove_favorite")?;
        state.username_for_token(token)?;

        let user = state.users.get_mut(username).ok_or(Error::Api {
            status: 404,
            message: "no such user".to_string(),
        })?;
        user.favorite_ids.retain(|id| id != story_id);
        Ok(())
    }
}

/// Test harness: a session wired to a mock backend.
pub struct TestHarness {
    /// Handle onto the mock for seeding, failure injection, and inspection.
    pub backend: MockBackend,
    /// The session under test.
    pub session: Session,
}

impl TestHarness {
    /// An anonymous session over an empty mock server.
    pub fn new() -> Self {
        let backend = MockBackend::new();
        let session = Session::new(backend.clone());
        Self { backend, session }
    }

    /// A session signed in as `tester`, over an empty mock server.
    pub async fn logged_in() -> Self {
        let mut harness = Self::new();
        harness.backend.seed_user("tester", "hunter2", "Testy Tester");
        harness
            .session
            .login("tester", "hunter2")
            .await
            .expect("seeded login should succeed");
        harness
    }

    /// Front page ids, newest first.
    pub fn front_page_ids(&self) -> Vec<StoryId> {
        self.session
            .store()
            .front_page()
            .map(|s| s.id.clone())
            .collect()
    }

    /// Favorite ids, in marking order.
    pub fn favorite_ids(&self) -> Vec<StoryId> {
        self.session
            .store()
            .favorites()
            .map(|s| s.id.clone())
            .collect()
    }

    /// Own-story ids.
    pub fn own_story_ids(&self) -> Vec<StoryId> {
        self.session
            .store()
            .own_stories()
            .map(|s| s.id.clone())
            .collect()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the front page holds exactly these ids, in order.
#[track_caller]
pub fn assert_front_page(harness: &TestHarness, expected: &[&str]) {
    let actual = harness.front_page_ids();
    let expected: Vec<StoryId> = expected.iter().copied().map(StoryId::from).collect();
    assert_eq!(
        actual, expected,
        "Expected front page {expected:?}, got {actual:?}"
    );
}

/// Assert a story is marked as a favorite.
#[track_caller]
pub fn assert_favorite(harness: &TestHarness, id: &str) {
    assert!(
        harness.session.is_favorite(&StoryId::from(id)),
        "Expected '{id}' to be a favorite"
    );
}

/// Assert a story is NOT marked as a favorite.
#[track_caller]
pub fn assert_not_favorite(harness: &TestHarness, id: &str) {
    assert!(
        !harness.session.is_favorite(&StoryId::from(id)),
        "Expected '{id}' to NOT be a favorite"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_assigns_ids_in_order() {
        let backend = MockBackend::new();
        let first = backend.seed_story("A", "a", "https://example.com/a", "u");
        let second = backend.seed_story("B", "b", "https://example.com/b", "u");

        assert_eq!(first.story_id, "story-0");
        assert_eq!(second.story_id, "story-1");
        assert!(second.created_at > first.created_at);
    }

    #[tokio::test]
    async fn test_mock_rejects_unknown_token() {
        let backend = MockBackend::new();
        let result = backend
            .create_story(
                "bogus",
                &StoryPayload {
                    title: "T".to_string(),
                    author: "A".to_string(),
                    url: "https://example.com".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(Error::Api { status: 401, .. })));
    }

    #[tokio::test]
    async fn test_mock_forced_error_consumed_once() {
        let backend = MockBackend::new();
        backend.fail_next_status(500);

        assert!(backend.list_stories().await.is_err());
        assert!(backend.list_stories().await.is_ok());
        assert_eq!(backend.calls(), vec!["list_stories", "list_stories"]);
    }

    #[tokio::test]
    async fn test_harness_logged_in() {
        let harness = TestHarness::logged_in().await;
        assert!(harness.session.is_logged_in());
        assert_eq!(
            harness.session.current_user().unwrap().username,
            "tester"
        );
    }
}
