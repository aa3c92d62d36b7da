//! Persisted story snapshots.

use crate::{Page, Persona, StoryConfig};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Everything needed to resume a story after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into))]
pub struct SavedStory {
    /// Protagonist
    #[builder(default)]
    hero: Option<Persona>,
    /// Co-star, if established
    #[builder(default)]
    #[serde(default)]
    costar: Option<Persona>,
    /// Story configuration
    #[builder(default)]
    config: StoryConfig,
    /// History, in page order
    #[builder(default)]
    #[serde(default)]
    pages: Vec<Page>,
    /// Reading position (sheet index in the presentation layer)
    #[builder(default)]
    #[serde(default)]
    current_sheet: usize,
}

impl SavedStory {
    /// Creates a new builder for `SavedStory`.
    pub fn builder() -> SavedStoryBuilder {
        SavedStoryBuilder::default()
    }

    /// Create a snapshot from all of its parts.
    pub fn new(
        hero: Option<Persona>,
        costar: Option<Persona>,
        config: StoryConfig,
        pages: Vec<Page>,
        current_sheet: usize,
    ) -> Self {
        Self {
            hero,
            costar,
            config,
            pages,
            current_sheet,
        }
    }

    /// Split into owned parts.
    pub fn into_parts(
        self,
    ) -> (
        Option<Persona>,
        Option<Persona>,
        StoryConfig,
        Vec<Page>,
        usize,
    ) {
        (
            self.hero,
            self.costar,
            self.config,
            self.pages,
            self.current_sheet,
        )
    }
}
