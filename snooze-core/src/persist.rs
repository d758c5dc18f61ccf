//! Saved-credential persistence for "remember me" behavior.
//!
//! The site keeps the issued token and username between visits; here they
//! live in a small version-checked JSON file that the front-end reads at
//! startup and feeds to
//! [`Session::login_via_stored_credentials`](crate::session::Session::login_via_stored_credentials).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors from credential persistence.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current credential file version.
const CREDENTIALS_VERSION: u32 = 1;

/// Remembered login credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCredentials {
    /// File format version for compatibility checking.
    pub version: u32,

    pub username: String,

    /// The session token issued at signup/login.
    pub token: String,
}

impl SavedCredentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            version: CREDENTIALS_VERSION,
            username: username.into(),
            token: token.into(),
        }
    }

    /// Save to a JSON file, creating parent directories as needed.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Load from a JSON file, rejecting incompatible versions.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        let saved: Self = serde_json::from_str(&content)?;

        if saved.version != CREDENTIALS_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: CREDENTIALS_VERSION,
                found: saved.version,
            });
        }

        Ok(saved)
    }
}

/// Delete the credential file, e.g. on logout. Missing file is fine.
pub async fn forget_credentials(path: impl AsRef<Path>) -> Result<(), PersistError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// The credential file location under a base directory.
pub fn credentials_path(base_dir: impl AsRef<Path>) -> PathBuf {
    base_dir.as_ref().join("credentials.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = credentials_path(dir.path());

        let saved = SavedCredentials::new("crabfan", "token-123");
        saved.save_json(&path).await.expect("Save should succeed");

        let loaded = SavedCredentials::load_json(&path)
            .await
            .expect("Load should succeed");
        assert_eq!(loaded.username, "crabfan");
        assert_eq!(loaded.token, "token-123");
        assert_eq!(loaded.version, CREDENTIALS_VERSION);
    }

    #[tokio::test]
    async fn test_load_rejects_version_mismatch() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = credentials_path(dir.path());

        let content = r#"{"version": 99, "username": "crabfan", "token": "t"}"#;
        tokio::fs::write(&path, content).await.unwrap();

        let result = SavedCredentials::load_json(&path).await;
        assert!(matches!(
            result,
            Err(PersistError::VersionMismatch { found: 99, .. })
        ));
    }

    #[tokio::test]
    async fn test_forget_credentials_is_idempotent() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = credentials_path(dir.path());

        SavedCredentials::new("u", "t")
            .save_json(&path)
            .await
            .unwrap();
        forget_credentials(&path).await.expect("First delete");
        assert!(!path.exists());
        forget_credentials(&path).await.expect("Second delete");
    }
}
