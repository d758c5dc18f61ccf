//! The story store: one authoritative map of stories plus ordered views.
//!
//! The front page, the user's favorites, and the user's own stories are id
//! lists into a single `StoryId -> Story` map, so a story visible in several
//! views is the same entity and removal happens in exactly one place.

use crate::story::{Story, StoryId};
use std::collections::HashMap;

/// All stories known to the client, with per-view orderings.
///
/// Invariants:
/// - the front page is newest-first,
/// - the favorites list holds no duplicate id,
/// - every id in a view list resolves in the map.
#[derive(Debug, Default)]
pub struct StoryStore {
    stories: HashMap<StoryId, Story>,
    front_page: Vec<StoryId>,
    favorites: Vec<StoryId>,
    own: Vec<StoryId>,
}

impl StoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a story by id.
    pub fn get(&self, id: &StoryId) -> Option<&Story> {
        self.stories.get(id)
    }

    /// Replace the front page with a fresh fetch, newest first.
    ///
    /// Stories no longer referenced by any view are dropped from the map;
    /// favorites and own stories keep their entries alive.
    pub fn replace_front_page(&mut self, stories: Vec<Story>) {
        self.front_page = stories.iter().map(|s| s.id.clone()).collect();
        for story in stories {
            self.stories.insert(story.id.clone(), story);
        }
        self.prune();
    }

    /// Insert a freshly submitted story at the top of the front page.
    pub fn insert_front(&mut self, story: Story) {
        let id = story.id.clone();
        self.stories.insert(id.clone(), story);
        self.front_page.retain(|existing| *existing != id);
        self.front_page.insert(0, id);
    }

    /// Apply an edited story: replace the value and move it to the top.
    pub fn apply_edit(&mut self, story: Story) {
        self.insert_front(story);
    }

    /// Record a story as authored by the current user.
    pub fn add_own(&mut self, id: StoryId) {
        if !self.own.contains(&id) {
            self.own.push(id);
        }
    }

    /// Remove a story everywhere: map, front page, favorites, own stories.
    ///
    /// Returns the removed story, or `None` if the id was unknown.
    pub fn remove(&mut self, id: &StoryId) -> Option<Story> {
        self.front_page.retain(|existing| existing != id);
        self.favorites.retain(|existing| existing != id);
        self.own.retain(|existing| existing != id);
        self.stories.remove(id)
    }

    /// The front page, newest first.
    pub fn front_page(&self) -> impl Iterator<Item = &Story> {
        self.front_page.iter().filter_map(|id| self.stories.get(id))
    }

    /// The current user's favorites, in marking order.
    pub fn favorites(&self) -> impl Iterator<Item = &Story> {
        self.favorites.iter().filter_map(|id| self.stories.get(id))
    }

    /// Stories authored by the current user.
    pub fn own_stories(&self) -> impl Iterator<Item = &Story> {
        self.own.iter().filter_map(|id| self.stories.get(id))
    }

    /// True if the story is marked as a favorite.
    pub fn is_favorite(&self, id: &StoryId) -> bool {
        self.favorites.contains(id)
    }

    /// Mark a known story as a favorite. Returns `false` (and changes
    /// nothing) if the story is unknown or already a favorite.
    pub fn add_favorite_local(&mut self, id: StoryId) -> bool {
        if !self.stories.contains_key(&id) || self.favorites.contains(&id) {
            return false;
        }
        self.favorites.push(id);
        true
    }

    /// Unmark a favorite, returning the position it held so a failed remote
    /// call can restore it.
    pub fn remove_favorite_local(&mut self, id: &StoryId) -> Option<usize> {
        let position = self.favorites.iter().position(|existing| existing == id)?;
        self.favorites.remove(position);
        Some(position)
    }

    /// Re-insert a favorite at its previous position (rollback path).
    pub fn restore_favorite_local(&mut self, position: usize, id: StoryId) {
        let position = position.min(self.favorites.len());
        self.favorites.insert(position, id);
    }

    /// Load the signed-in user's collections from a server user record.
    pub fn set_user_collections(&mut self, favorites: Vec<Story>, own: Vec<Story>) {
        self.favorites = favorites.iter().map(|s| s.id.clone()).collect();
        self.favorites.dedup();
        self.own = own.iter().map(|s| s.id.clone()).collect();
        for story in favorites.into_iter().chain(own) {
            self.stories.insert(story.id.clone(), story);
        }
    }

    /// Forget the per-user collections on logout.
    pub fn clear_user_collections(&mut self) {
        self.favorites.clear();
        self.own.clear();
        self.prune();
    }

    /// Drop map entries no view references anymore.
    fn prune(&mut self) {
        let front_page = &self.front_page;
        let favorites = &self.favorites;
        let own = &self.own;
        self.stories.retain(|id, _| {
            front_page.contains(id) || favorites.contains(id) || own.contains(id)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn story(id: &str) -> Story {
        Story {
            id: StoryId::new(id),
            title: format!("Story {id}"),
            author: "Author".to_string(),
            url: "https://example.com/a".to_string(),
            username: "poster".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn ids(iter: impl Iterator<Item = &'static str>) -> Vec<StoryId> {
        iter.map(StoryId::from).collect()
    }

    fn front_ids(store: &StoryStore) -> Vec<StoryId> {
        store.front_page().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn test_replace_front_page_keeps_order() {
        let mut store = StoryStore::new();
        store.replace_front_page(vec![story("a"), story("b"), story("c")]);

        assert_eq!(front_ids(&store), ids(["a", "b", "c"].into_iter()));
    }

    #[test]
    fn test_insert_front_goes_to_index_zero() {
        let mut store = StoryStore::new();
        store.replace_front_page(vec![story("a"), story("b")]);
        store.insert_front(story("c"));

        assert_eq!(front_ids(&store), ids(["c", "a", "b"].into_iter()));
    }

    #[test]
    fn test_apply_edit_moves_story_to_front_exactly_once() {
        let mut store = StoryStore::new();
        store.replace_front_page(vec![story("a"), story("b"), story("c")]);

        let mut edited = story("b");
        edited.title = "Edited".to_string();
        store.apply_edit(edited);

        assert_eq!(front_ids(&store), ids(["b", "a", "c"].into_iter()));
        assert_eq!(store.get(&StoryId::new("b")).unwrap().title, "Edited");
    }

    #[test]
    fn test_remove_clears_every_view() {
        let mut store = StoryStore::new();
        store.replace_front_page(vec![story("a"), story("b"), story("c")]);
        store.add_own(StoryId::new("b"));
        assert!(store.add_favorite_local(StoryId::new("b")));

        let removed = store.remove(&StoryId::new("b"));
        assert!(removed.is_some());

        assert_eq!(front_ids(&store), ids(["a", "c"].into_iter()));
        assert!(!store.is_favorite(&StoryId::new("b")));
        assert_eq!(store.own_stories().count(), 0);
        assert!(store.get(&StoryId::new("b")).is_none());
    }

    #[test]
    fn test_favorites_reject_duplicates_and_unknown_stories() {
        let mut store = StoryStore::new();
        store.replace_front_page(vec![story("a")]);

        assert!(store.add_favorite_local(StoryId::new("a")));
        assert!(!store.add_favorite_local(StoryId::new("a")));
        assert!(!store.add_favorite_local(StoryId::new("ghost")));
        assert_eq!(store.favorites().count(), 1);
    }

    #[test]
    fn test_favorite_rollback_restores_position() {
        let mut store = StoryStore::new();
        store.replace_front_page(vec![story("a"), story("b"), story("c")]);
        store.add_favorite_local(StoryId::new("a"));
        store.add_favorite_local(StoryId::new("b"));
        store.add_favorite_local(StoryId::new("c"));

        let position = store.remove_favorite_local(&StoryId::new("b")).unwrap();
        assert_eq!(position, 1);
        store.restore_favorite_local(position, StoryId::new("b"));

        let favorite_ids: Vec<StoryId> = store.favorites().map(|s| s.id.clone()).collect();
        assert_eq!(favorite_ids, ids(["a", "b", "c"].into_iter()));
    }

    #[test]
    fn test_refresh_keeps_stories_referenced_by_user_views() {
        let mut store = StoryStore::new();
        store.replace_front_page(vec![story("a"), story("b")]);
        store.add_favorite_local(StoryId::new("b"));

        // "b" drops off the front page but stays reachable as a favorite.
        store.replace_front_page(vec![story("a"), story("c")]);

        assert_eq!(front_ids(&store), ids(["a", "c"].into_iter()));
        assert!(store.get(&StoryId::new("b")).is_some());
        assert!(store.is_favorite(&StoryId::new("b")));
    }

    #[test]
    fn test_clear_user_collections_prunes_orphans() {
        let mut store = StoryStore::new();
        store.set_user_collections(vec![story("fav")], vec![story("own")]);
        assert_eq!(store.favorites().count(), 1);

        store.clear_user_collections();
        assert_eq!(store.favorites().count(), 0);
        assert_eq!(store.own_stories().count(), 0);
        assert!(store.get(&StoryId::new("fav")).is_none());
    }
}
