//! Story configuration and launch input.

use crate::{Genre, Persona, Tone, language_name};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Settings that stay fixed for one story run.
///
/// The tone is drawn at launch from the genre's pool and never changes
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into))]
pub struct StoryConfig {
    /// Story genre
    #[builder(default)]
    #[serde(default)]
    genre: Genre,
    /// Output locale code, e.g. "en-US"
    #[builder(default = "String::from(\"en-US\")")]
    #[serde(default = "default_language")]
    language: String,
    /// Narrative voice
    #[builder(default)]
    #[serde(default)]
    tone: Tone,
    /// Premise, used only for the custom genre
    #[builder(default)]
    #[serde(default)]
    premise: String,
    /// Longer captions and more internal monologue
    #[builder(default)]
    #[serde(default)]
    rich_mode: bool,
}

fn default_language() -> String {
    "en-US".to_string()
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            genre: Genre::default(),
            language: default_language(),
            tone: Tone::default(),
            premise: String::new(),
            rich_mode: false,
        }
    }
}

impl StoryConfig {
    /// Creates a new builder for `StoryConfig`.
    pub fn builder() -> StoryConfigBuilder {
        StoryConfigBuilder::default()
    }

    /// Create a configuration from all of its parts.
    pub fn new(
        genre: Genre,
        language: impl Into<String>,
        tone: Tone,
        premise: impl Into<String>,
        rich_mode: bool,
    ) -> Self {
        Self {
            genre,
            language: language.into(),
            tone,
            premise: premise.into(),
            rich_mode,
        }
    }

    /// Prompt name of the output language.
    pub fn language_name(&self) -> &'static str {
        language_name(&self.language)
    }
}

/// Everything the reader provides before launching a story.
///
/// # Examples
///
/// ```
/// use heroes_core::{Genre, StorySetup};
///
/// let setup = StorySetup::builder()
///     .genre(Genre::Custom)
///     .premise("A lighthouse keeper finds a door in the sea")
///     .build()
///     .unwrap();
///
/// assert!(setup.hero().is_none());
/// assert_eq!(setup.language(), "en-US");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Builder)]
#[builder(setter(into))]
pub struct StorySetup {
    /// Protagonist (required to launch)
    #[builder(default)]
    hero: Option<Persona>,
    /// Optional co-star
    #[builder(default)]
    costar: Option<Persona>,
    /// Story genre
    #[builder(default)]
    genre: Genre,
    /// Output locale code
    #[builder(default = "String::from(\"en-US\")")]
    language: String,
    /// Premise for the custom genre
    #[builder(default)]
    premise: String,
    /// Rich mode flag
    #[builder(default)]
    rich_mode: bool,
}

impl StorySetup {
    /// Creates a new builder for `StorySetup`.
    pub fn builder() -> StorySetupBuilder {
        StorySetupBuilder::default()
    }

    /// Story configuration for this setup with the given tone.
    pub fn config_with_tone(&self, tone: Tone) -> StoryConfig {
        StoryConfig::new(
            self.genre,
            self.language.clone(),
            tone,
            self.premise.clone(),
            self.rich_mode,
        )
    }
}
