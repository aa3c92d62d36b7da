//! Share tokens: a story's beats packed into a URL-safe string.
//!
//! A token carries the story configuration plus, for every story page with a
//! beat, its caption, dialogue, scene, focus character, choices and resolved
//! choice. Images are not included; a replay regenerates them.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use heroes_core::{Beat, FocusChar, Genre, Page, PageKind, StoryConfig, Tone};
use heroes_error::{HeroesResult, JsonError, StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One shared beat, with compact field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedBeat {
    /// Page number
    #[serde(rename = "i")]
    pub page: u32,
    /// Caption
    #[serde(rename = "c", default)]
    pub caption: String,
    /// Dialogue
    #[serde(rename = "d", default)]
    pub dialogue: String,
    /// Scene description
    #[serde(rename = "s", default)]
    pub scene: String,
    /// Focus character
    #[serde(rename = "fc", default)]
    pub focus_char: FocusChar,
    /// Choices offered
    #[serde(rename = "ch", default)]
    pub choices: Vec<String>,
    /// Choice the reader committed
    #[serde(rename = "rc", default, skip_serializing_if = "Option::is_none")]
    pub resolved_choice: Option<String>,
}

impl SharedBeat {
    /// Rebuild the beat.
    pub fn to_beat(&self) -> Beat {
        Beat::new(
            self.caption.clone(),
            self.dialogue.clone(),
            self.scene.clone(),
            self.focus_char,
            self.choices.clone(),
        )
    }
}

/// The shareable subset of a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedStory {
    /// Genre
    #[serde(rename = "gen")]
    pub genre: Genre,
    /// Output locale code
    #[serde(rename = "lang")]
    pub language: String,
    /// Tone
    #[serde(rename = "t")]
    pub tone: Tone,
    /// Custom premise
    #[serde(rename = "p", default)]
    pub premise: String,
    /// Rich mode flag
    #[serde(rename = "r", default)]
    pub rich_mode: bool,
    /// Story beats in page order
    #[serde(rename = "b", default)]
    pub beats: Vec<SharedBeat>,
}

impl SharedStory {
    /// Collect the shareable parts of a story.
    ///
    /// Only story pages with a beat are included, sorted by page number.
    pub fn from_pages(config: &StoryConfig, pages: &[Page]) -> Self {
        let mut story_pages: Vec<&Page> = pages
            .iter()
            .filter(|page| *page.kind() == PageKind::Story && page.narrative().is_some())
            .collect();
        story_pages.sort_by_key(|page| *page.index());

        let beats = story_pages
            .into_iter()
            .filter_map(|page| {
                page.narrative().as_ref().map(|beat| SharedBeat {
                    page: *page.index(),
                    caption: beat.caption().clone(),
                    dialogue: beat.dialogue().clone(),
                    scene: beat.scene().clone(),
                    focus_char: *beat.focus_char(),
                    choices: beat.choices().clone(),
                    resolved_choice: page.resolved_choice().clone(),
                })
            })
            .collect();

        Self {
            genre: *config.genre(),
            language: config.language().clone(),
            tone: *config.tone(),
            premise: config.premise().clone(),
            rich_mode: *config.rich_mode(),
            beats,
        }
    }

    /// The story configuration carried by the token.
    pub fn config(&self) -> StoryConfig {
        StoryConfig::new(
            self.genre,
            self.language.clone(),
            self.tone,
            self.premise.clone(),
            self.rich_mode,
        )
    }

    /// Shared beat for a page number.
    pub fn beat_for(&self, page: u32) -> Option<&SharedBeat> {
        self.beats.iter().find(|beat| beat.page == page)
    }

    /// Encode as JSON, then URL-safe base64 without padding.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_token(&self) -> HeroesResult<String> {
        let json = serde_json::to_vec(self)
            .map_err(|e| JsonError::new(format!("Failed to serialize share token: {}", e)))?;
        let token = URL_SAFE_NO_PAD.encode(json);
        debug!(beats = self.beats.len(), len = token.len(), "Encoded share token");
        Ok(token)
    }

    /// Decode a token produced by [`SharedStory::to_token`].
    ///
    /// Surrounding whitespace and trailing `=` padding are tolerated.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidShareToken` storage error for bad base64 or JSON.
    pub fn from_token(token: &str) -> HeroesResult<Self> {
        let trimmed = token.trim().trim_end_matches('=');
        let bytes = URL_SAFE_NO_PAD.decode(trimmed).map_err(|e| {
            StorageError::new(StorageErrorKind::InvalidShareToken(format!(
                "not base64: {}",
                e
            )))
        })?;
        let story: Self = serde_json::from_slice(&bytes).map_err(|e| {
            StorageError::new(StorageErrorKind::InvalidShareToken(format!(
                "not a story: {}",
                e
            )))
        })?;
        debug!(beats = story.beats.len(), "Decoded share token");
        Ok(story)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heroes_core::{PageStatus, PageUpdate, StoryLayout};

    fn story_page(index: u32, caption: &str, choices: Vec<&str>, resolved: Option<&str>) -> Page {
        let layout = StoryLayout::default();
        let mut page = Page::placeholder(index, &layout);
        let beat = Beat::builder()
            .caption(caption)
            .dialogue(format!("line {}", index))
            .scene(format!("HERO on page {}", index))
            .focus_char(if index % 2 == 0 {
                FocusChar::Friend
            } else {
                FocusChar::Hero
            })
            .choices(choices.iter().map(|c| c.to_string()).collect::<Vec<_>>())
            .build()
            .unwrap();
        let mut update = PageUpdate::default()
            .with_status(PageStatus::Ready)
            .with_narrative(beat);
        if let Some(choice) = resolved {
            update = update.with_resolved_choice(choice.to_string());
        }
        page.apply(update);
        page
    }

    #[test]
    fn test_token_roundtrip_preserves_story_sequence() {
        let config = StoryConfig::builder()
            .genre(Genre::Custom)
            .language("ja-JP")
            .tone(Tone::Quippy)
            .premise("Cats run the post office")
            .rich_mode(true)
            .build()
            .unwrap();
        let layout = StoryLayout::default();
        // Out of order, with a cover and an unfinished page mixed in
        let pages = vec![
            story_page(3, "Decide.", vec!["Trust her", "Walk away"], Some("Trust her")),
            Page::placeholder(0, &layout),
            story_page(1, "It began.", vec![], None),
            story_page(2, "It grew.", vec![], None),
            Page::placeholder(4, &layout),
        ];

        let shared = SharedStory::from_pages(&config, &pages);
        let decoded = SharedStory::from_token(&shared.to_token().unwrap()).unwrap();

        assert_eq!(decoded, shared);
        assert_eq!(decoded.config(), config);
        let captions: Vec<_> = decoded.beats.iter().map(|b| b.caption.as_str()).collect();
        assert_eq!(captions, vec!["It began.", "It grew.", "Decide."]);
        assert_eq!(decoded.beat_for(2).unwrap().focus_char, FocusChar::Friend);
        let decision = decoded.beat_for(3).unwrap();
        assert_eq!(decision.choices, vec!["Trust her", "Walk away"]);
        assert_eq!(decision.resolved_choice.as_deref(), Some("Trust her"));
        assert!(decoded.beat_for(4).is_none());
    }

    #[test]
    fn test_token_is_url_safe() {
        let config = StoryConfig::default();
        let pages = vec![story_page(1, "??>>~~ émigré ünïcode", vec![], None)];
        let token = SharedStory::from_pages(&config, &pages).to_token().unwrap();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let err = SharedStory::from_token("!!not base64!!").unwrap_err();
        assert!(format!("{}", err).contains("Invalid share token"));

        let not_json = URL_SAFE_NO_PAD.encode(b"hello");
        assert!(SharedStory::from_token(&not_json).is_err());
    }

    #[test]
    fn test_to_beat_restores_choices() {
        let shared = SharedBeat {
            page: 3,
            caption: "c".to_string(),
            dialogue: String::new(),
            scene: "s".to_string(),
            focus_char: FocusChar::Other,
            choices: vec!["A".to_string(), "B".to_string()],
            resolved_choice: None,
        };
        let beat = shared.to_beat();
        assert_eq!(beat.choices().len(), 2);
        assert_eq!(beat.focus_char(), &FocusChar::Other);
    }
}
