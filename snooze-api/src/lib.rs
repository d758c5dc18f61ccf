//! Minimal typed client for the Hack or Snooze story API.
//!
//! This crate provides a focused client for the story-sharing REST API with:
//! - Story listing, submission, editing, and deletion
//! - Signup, login, and token revalidation
//! - Per-user favorite management
//!
//! All mutating calls carry the session token issued at signup/login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://hack-or-snooze-v3.herokuapp.com";

/// Errors that can occur when talking to the story API.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// The HTTP status of a remote rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// One story as the server represents it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRecord {
    pub story_id: String,
    pub title: String,
    pub author: String,
    pub url: String,
    /// Username of the submitter.
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// One user as the server represents it, including owned collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub favorites: Vec<StoryRecord>,
    #[serde(default)]
    pub stories: Vec<StoryRecord>,
}

/// Signup/login result: the user record plus the issued session token.
#[derive(Debug, Clone)]
pub struct AuthRecord {
    pub user: UserRecord,
    pub token: String,
}

/// Fields of a story to create.
#[derive(Debug, Clone, Serialize)]
pub struct StoryPayload {
    pub title: String,
    pub author: String,
    pub url: String,
}

/// Partial update for an existing story. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl StoryPatch {
    /// True if no field is set; an empty patch is not worth a request.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.url.is_none()
    }
}

/// Story API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    /// Create a client against the default deployment.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different deployment of the API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch all known stories, newest first. No auth required.
    pub async fn list_stories(&self) -> Result<Vec<StoryRecord>, Error> {
        let response = self
            .client
            .get(format!("{}/stories", self.base_url))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let body: StoriesResponse = parse_response(response).await?;
        Ok(body.stories)
    }

    /// Submit a new story. The server assigns the id and timestamp.
    pub async fn create_story(
        &self,
        token: &str,
        story: &StoryPayload,
    ) -> Result<StoryRecord, Error> {
        let response = self
            .client
            .post(format!("{}/stories", self.base_url))
            .json(&StoryBody {
                token,
                story: StoryFields::Full(story),
            })
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let body: StoryResponse = parse_response(response).await?;
        Ok(body.story)
    }

    /// Update fields of an existing story in a single request.
    pub async fn update_story(
        &self,
        token: &str,
        story_id: &str,
        patch: &StoryPatch,
    ) -> Result<StoryRecord, Error> {
        let response = self
            .client
            .patch(format!("{}/stories/{story_id}", self.base_url))
            .json(&StoryBody {
                token,
                story: StoryFields::Patch(patch),
            })
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let body: StoryResponse = parse_response(response).await?;
        Ok(body.story)
    }

    /// Delete a story owned by the token's user.
    pub async fn delete_story(&self, token: &str, story_id: &str) -> Result<(), Error> {
        let response = self
            .client
            .delete(format!("{}/stories/{story_id}", self.base_url))
            .json(&TokenBody { token })
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        check_status(response).await?;
        Ok(())
    }

    /// Register a new account. The server answers 409 for a taken username.
    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthRecord, Error> {
        let response = self
            .client
            .post(format!("{}/signup", self.base_url))
            .json(&serde_json::json!({
                "user": { "username": username, "password": password, "name": name }
            }))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let body: AuthResponse = parse_response(response).await?;
        Ok(AuthRecord {
            user: body.user,
            token: body.token,
        })
    }

    /// Log in with an existing account.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthRecord, Error> {
        let response = self
            .client
            .post(format!("{}/login", self.base_url))
            .json(&serde_json::json!({
                "user": { "username": username, "password": password }
            }))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let body: AuthResponse = parse_response(response).await?;
        Ok(AuthRecord {
            user: body.user,
            token: body.token,
        })
    }

    /// Fetch a user record, revalidating a previously issued token.
    pub async fn fetch_user(&self, token: &str, username: &str) -> Result<UserRecord, Error> {
        let response = self
            .client
            .get(format!("{}/users/{username}", self.base_url))
            .query(&[("token", token)])
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let body: UserResponse = parse_response(response).await?;
        Ok(body.user)
    }

    /// Mark a story as a favorite of the given user.
    pub async fn add_favorite(
        &self,
        token: &str,
        username: &str,
        story_id: &str,
    ) -> Result<(), Error> {
        let response = self
            .client
            .post(format!(
                "{}/users/{username}/favorites/{story_id}",
                self.base_url
            ))
            .json(&TokenBody { token })
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        check_status(response).await?;
        Ok(())
    }

    /// Remove a story from the given user's favorites.
    pub async fn remove_favorite(
        &self,
        token: &str,
        username: &str,
        story_id: &str,
    ) -> Result<(), Error> {
        let response = self
            .client
            .delete(format!(
                "{}/users/{username}/favorites/{story_id}",
                self.base_url
            ))
            .json(&TokenBody { token })
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        check_status(response).await?;
        Ok(())
    }
}

/// Reject non-2xx responses, preserving the body text for the error message.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, Error> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Api {
            status,
            message: body,
        });
    }
    Ok(response)
}

/// Check the status, then deserialize the body.
async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, Error> {
    let response = check_status(response).await?;
    response
        .json()
        .await
        .map_err(|e| Error::Parse(e.to_string()))
}

// ============================================================================
// Internal wire types
// ============================================================================

#[derive(Serialize)]
struct TokenBody<'a> {
    token: &'a str,
}

#[derive(Serialize)]
struct StoryBody<'a> {
    token: &'a str,
    story: StoryFields<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum StoryFields<'a> {
    Full(&'a StoryPayload),
    Patch(&'a StoryPatch),
}

#[derive(Deserialize)]
struct StoriesResponse {
    stories: Vec<StoryRecord>,
}

#[derive(Deserialize)]
struct StoryResponse {
    story: StoryRecord,
}

#[derive(Deserialize)]
struct UserResponse {
    user: UserRecord,
}

#[derive(Deserialize)]
struct AuthResponse {
    user: UserRecord,
    token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_client_with_base_url() {
        let client = ApiClient::new().with_base_url("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_story_record_wire_format() {
        let json = r#"{
            "storyId": "5d9a2c66-9b36-4cc5-a7b9-1ad8b4a3f8f4",
            "title": "Ferris takes flight",
            "author": "C. Crab",
            "url": "https://example.com/ferris",
            "username": "crabfan",
            "createdAt": "2018-11-14T10:58:52.768Z"
        }"#;

        let record: StoryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.story_id, "5d9a2c66-9b36-4cc5-a7b9-1ad8b4a3f8f4");
        assert_eq!(record.title, "Ferris takes flight");
        assert_eq!(record.username, "crabfan");
    }

    #[test]
    fn test_user_record_defaults_empty_collections() {
        let json = r#"{
            "username": "crabfan",
            "name": "C. Fan",
            "createdAt": "2018-11-14T10:58:52.768Z"
        }"#;

        let record: UserRecord = serde_json::from_str(json).unwrap();
        assert!(record.favorites.is_empty());
        assert!(record.stories.is_empty());
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = StoryPatch {
            title: Some("New title".to_string()),
            ..StoryPatch::default()
        };

        let body = serde_json::to_value(StoryBody {
            token: "tok",
            story: StoryFields::Patch(&patch),
        })
        .unwrap();

        assert_eq!(body["token"], "tok");
        assert_eq!(body["story"]["title"], "New title");
        assert!(body["story"].get("author").is_none());
        assert!(body["story"].get("url").is_none());
    }

    #[test]
    fn test_empty_patch() {
        assert!(StoryPatch::default().is_empty());
        assert!(!StoryPatch {
            url: Some("https://example.com".to_string()),
            ..StoryPatch::default()
        }
        .is_empty());
    }
}
