//! Story value objects.
//!
//! A [`Story`] is an immutable record of one submitted link. Mutations happen
//! by replacing the value in the store, never by editing fields in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snooze_api::StoryRecord;
use std::fmt;

/// Server-assigned story identifier. Opaque, unique, stable once assigned.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(String);

impl StoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoryId({})", self.0)
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StoryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One story in the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    pub author: String,
    pub url: String,
    /// Username of the submitter.
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Story {
    /// The hostname segment of the story URL: the third `/`-delimited piece.
    ///
    /// This is not a URL parse; it assumes a well-formed absolute URL and
    /// returns `None` when the segment does not exist.
    pub fn host_name(&self) -> Option<&str> {
        self.url.split('/').nth(2)
    }
}

impl From<StoryRecord> for Story {
    fn from(record: StoryRecord) -> Self {
        Self {
            id: StoryId::new(record.story_id),
            title: record.title,
            author: record.author,
            url: record.url,
            username: record.username,
            created_at: record.created_at,
        }
    }
}

/// Fields of a story to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub title: String,
    pub author: String,
    pub url: String,
}

/// Changed fields for an edit. Unset fields are left untouched on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
}

impl StoryUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn story_with_url(url: &str) -> Story {
        Story {
            id: StoryId::new("s1"),
            title: "Title".to_string(),
            author: "Author".to_string(),
            url: url.to_string(),
            username: "poster".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_host_name_from_absolute_url() {
        let story = story_with_url("https://example.com/a/b");
        assert_eq!(story.host_name(), Some("example.com"));
    }

    #[test]
    fn test_host_name_without_path() {
        let story = story_with_url("http://example.com");
        assert_eq!(story.host_name(), Some("example.com"));
    }

    #[test]
    fn test_host_name_malformed_input() {
        let story = story_with_url("not a url");
        assert_eq!(story.host_name(), None);
    }

    #[test]
    fn test_story_from_record() {
        let record = snooze_api::StoryRecord {
            story_id: "abc-123".to_string(),
            title: "T".to_string(),
            author: "A".to_string(),
            url: "https://example.com".to_string(),
            username: "u".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        };

        let story: Story = record.into();
        assert_eq!(story.id, StoryId::new("abc-123"));
        assert_eq!(story.title, "T");
        assert_eq!(story.username, "u");
    }

    #[test]
    fn test_update_is_empty() {
        assert!(StoryUpdate::default().is_empty());
        assert!(!StoryUpdate {
            title: Some("x".to_string()),
            ..StoryUpdate::default()
        }
        .is_empty());
    }
}
