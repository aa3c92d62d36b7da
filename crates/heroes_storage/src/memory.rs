//! In-memory story persistence.

use async_trait::async_trait;
use heroes_core::SavedStory;
use heroes_error::HeroesResult;
use heroes_interface::StoryPersistence;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Keeps snapshots in a shared map. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateStore {
    stories: Arc<Mutex<HashMap<String, SavedStory>>>,
}

impl InMemoryStateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot stored under `key`, without going through the async API.
    pub fn get(&self, key: &str) -> Option<SavedStory> {
        self.stories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.stories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StoryPersistence for InMemoryStateStore {
    async fn save(&self, key: &str, story: &SavedStory) -> HeroesResult<()> {
        self.stories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), story.clone());
        Ok(())
    }

    async fn load(&self, key: &str) -> HeroesResult<Option<SavedStory>> {
        Ok(self.get(key))
    }

    async fn clear(&self, key: &str) -> HeroesResult<()> {
        self.stories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
