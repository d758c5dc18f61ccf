//! Domain and session state for the Hack or Snooze client.
//!
//! This crate provides:
//! - `Story` value objects and the authoritative story store
//! - A `Session` state machine over signup/login/logout and every
//!   story operation (submit, edit, delete, favorite)
//! - Saved-credential persistence for "remember me" behavior
//! - A deterministic mock backend for tests
//!
//! # Quick Start
//!
//! ```ignore
//! use snooze_api::ApiClient;
//! use snooze_core::{NewStory, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = Session::remote(ApiClient::new());
//!     session.refresh_stories().await?;
//!
//!     session.login("crabfan", "hunter2").await?;
//!     let story = session
//!         .add_story(NewStory {
//!             title: "Ferris takes flight".into(),
//!             author: "C. Crab".into(),
//!             url: "https://example.com/ferris".into(),
//!         })
//!         .await?;
//!     println!("submitted as {}", story.id);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod persist;
pub mod session;
pub mod store;
pub mod story;
pub mod testing;

// Primary public API
pub use backend::{RemoteBackend, StoryBackend};
pub use persist::{credentials_path, forget_credentials, PersistError, SavedCredentials};
pub use session::{Session, SessionError, User};
pub use store::StoryStore;
pub use story::{NewStory, Story, StoryId, StoryUpdate};
