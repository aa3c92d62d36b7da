//! Narrative beats: the text content of one story page.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// The character a panel centres on.
///
/// Serialized in lowercase (`hero`, `friend`, `other`) to match the beat
/// output contract.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum FocusChar {
    /// The mandatory protagonist
    #[default]
    #[display("hero")]
    Hero,
    /// The co-star
    #[display("friend")]
    Friend,
    /// Anyone else, or no one in particular
    #[display("other")]
    Other,
}

impl FocusChar {
    /// Token used in prompts and the output schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusChar::Hero => "hero",
            FocusChar::Friend => "friend",
            FocusChar::Other => "other",
        }
    }
}

impl std::str::FromStr for FocusChar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hero" => Ok(FocusChar::Hero),
            "friend" => Ok(FocusChar::Friend),
            "other" => Ok(FocusChar::Other),
            other => Err(format!("Unknown focus character: {}", other)),
        }
    }
}

/// The narrative payload of one page.
///
/// # Examples
///
/// ```
/// use heroes_core::{Beat, FocusChar};
///
/// let beat = Beat::builder()
///     .caption("The city sleeps.")
///     .scene("HERO stands on a rooftop at night.")
///     .focus_char(FocusChar::Hero)
///     .build()
///     .unwrap();
///
/// assert!(beat.dialogue().is_empty());
/// assert!(beat.choices().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into))]
pub struct Beat {
    /// Narrator text or internal monologue
    #[builder(default)]
    #[serde(default)]
    caption: String,
    /// Character speech
    #[builder(default)]
    #[serde(default)]
    dialogue: String,
    /// Visual description for the illustrator, always in English
    #[builder(default)]
    #[serde(default)]
    scene: String,
    /// Which character the panel centres on
    #[builder(default)]
    #[serde(default)]
    focus_char: FocusChar,
    /// Options offered to the reader (decision pages only)
    #[builder(default)]
    #[serde(default)]
    choices: Vec<String>,
}

impl Beat {
    /// Creates a new builder for `Beat`.
    pub fn builder() -> BeatBuilder {
        BeatBuilder::default()
    }

    /// Create a beat from all of its parts.
    pub fn new(
        caption: impl Into<String>,
        dialogue: impl Into<String>,
        scene: impl Into<String>,
        focus_char: FocusChar,
        choices: Vec<String>,
    ) -> Self {
        Self {
            caption: caption.into(),
            dialogue: dialogue.into(),
            scene: scene.into(),
            focus_char,
            choices,
        }
    }

    /// Replace the focus character.
    pub fn set_focus_char(&mut self, focus: FocusChar) {
        self.focus_char = focus;
    }

    /// Replace the offered choices.
    pub fn set_choices(&mut self, choices: Vec<String>) {
        self.choices = choices;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_char_parses_case_insensitively() {
        assert_eq!("Friend".parse::<FocusChar>(), Ok(FocusChar::Friend));
        assert_eq!(" other ".parse::<FocusChar>(), Ok(FocusChar::Other));
        assert!("villain".parse::<FocusChar>().is_err());
    }

    #[test]
    fn test_beat_deserializes_with_missing_optional_fields() {
        let beat: Beat =
            serde_json::from_str(r#"{"caption":"c","scene":"s","focus_char":"friend"}"#).unwrap();
        assert_eq!(beat.focus_char(), &FocusChar::Friend);
        assert!(beat.dialogue().is_empty());
        assert!(beat.choices().is_empty());
    }
}
