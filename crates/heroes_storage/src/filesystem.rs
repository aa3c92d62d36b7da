//! Filesystem-based story persistence.

use async_trait::async_trait;
use heroes_core::SavedStory;
use heroes_error::{HeroesResult, JsonError, StorageError, StorageErrorKind};
use heroes_interface::StoryPersistence;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores each snapshot as pretty-printed JSON at `{base_path}/{key}.json`.
///
/// Writes go to a temporary file that is then renamed over the target, so a
/// crash mid-write never leaves a truncated save.
#[derive(Debug, Clone)]
pub struct FileSystemStateStore {
    base_path: PathBuf,
}

impl FileSystemStateStore {
    /// Create a store rooted at `base_path`, creating the directory.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> HeroesResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created story state store");
        Ok(Self { base_path })
    }

    /// Root directory of the store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> HeroesResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::new(StorageErrorKind::InvalidKey(key.to_string())).into());
        }
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl StoryPersistence for FileSystemStateStore {
    #[tracing::instrument(skip(self, story), fields(pages = story.pages().len()))]
    async fn save(&self, key: &str, story: &SavedStory) -> HeroesResult<()> {
        let path = self.key_path(key)?;
        let contents = serde_json::to_string_pretty(story)
            .map_err(|e| JsonError::new(format!("Failed to serialize story: {}", e)))?;

        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, contents).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;
        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;

        debug!(path = %path.display(), "Saved story");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn load(&self, key: &str) -> HeroesResult<Option<SavedStory>> {
        let path = self.key_path(key)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!(path = %path.display(), "No saved story");
            return Ok(None);
        }

        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        let story: SavedStory = serde_json::from_str(&contents)
            .map_err(|e| JsonError::new(format!("Failed to parse saved story: {}", e)))?;

        debug!(path = %path.display(), pages = story.pages().len(), "Loaded story");
        Ok(Some(story))
    }

    #[tracing::instrument(skip(self))]
    async fn clear(&self, key: &str) -> HeroesResult<()> {
        let path = self.key_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Cleared saved story");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileDelete(format!(
                "{}: {}",
                path.display(),
                e
            )))
            .into()),
        }
    }
}
