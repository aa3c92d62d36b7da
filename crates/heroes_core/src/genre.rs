//! Genres and tones.

use serde::{Deserialize, Serialize};

/// Story genre.
///
/// Serialized as its display name so saves and share tokens stay readable.
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
pub enum Genre {
    /// Classic horror
    #[display("Classic Horror")]
    #[serde(rename = "Classic Horror")]
    ClassicHorror,
    /// Superhero action
    #[default]
    #[display("Superhero Action")]
    #[serde(rename = "Superhero Action")]
    SuperheroAction,
    /// Dark science fiction
    #[display("Dark Sci-Fi")]
    #[serde(rename = "Dark Sci-Fi")]
    DarkSciFi,
    /// High fantasy
    #[display("High Fantasy")]
    #[serde(rename = "High Fantasy")]
    HighFantasy,
    /// Neon noir detective story
    #[display("Neon Noir Detective")]
    #[serde(rename = "Neon Noir Detective")]
    NeonNoirDetective,
    /// Post-apocalyptic wasteland
    #[display("Wasteland Apocalypse")]
    #[serde(rename = "Wasteland Apocalypse")]
    WastelandApocalypse,
    /// Lighthearted comedy
    #[display("Lighthearted Comedy")]
    #[serde(rename = "Lighthearted Comedy")]
    LightheartedComedy,
    /// Teen drama and slice of life
    #[display("Teen Drama / Slice of Life")]
    #[serde(rename = "Teen Drama / Slice of Life")]
    TeenDrama,
    /// User-supplied premise
    #[display("Custom")]
    #[serde(rename = "Custom")]
    Custom,
}

impl Genre {
    /// Whether the story is driven by a user premise instead of a genre.
    pub fn is_custom(&self) -> bool {
        matches!(self, Genre::Custom)
    }

    /// Genres where technobabble ("quantum", "timeline") is acceptable.
    pub fn allows_technobabble(&self) -> bool {
        matches!(self, Genre::DarkSciFi | Genre::SuperheroAction | Genre::Custom)
    }

    /// Genres whose stakes must stay social or emotional.
    pub fn requires_social_stakes(&self) -> bool {
        matches!(self, Genre::LightheartedComedy | Genre::TeenDrama)
    }

    /// Art style era used in panel prompts.
    pub fn style_era(&self) -> String {
        match self {
            Genre::Custom => "Modern American".to_string(),
            other => other.to_string(),
        }
    }

    /// Tones a story in this genre may be told in.
    ///
    /// # Examples
    ///
    /// ```
    /// use heroes_core::{Genre, Tone};
    ///
    /// assert_eq!(Genre::ClassicHorror.tone_pool(), &[Tone::InnerMonologue, Tone::Operatic]);
    /// assert_eq!(Genre::DarkSciFi.tone_pool().len(), 6);
    /// ```
    pub fn tone_pool(&self) -> &'static [Tone] {
        match self {
            Genre::LightheartedComedy | Genre::TeenDrama => LIGHT_TONES,
            Genre::ClassicHorror => HORROR_TONES,
            _ => ALL_TONES,
        }
    }
}

impl std::str::FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use strum::IntoEnumIterator;
        let wanted = s.trim();
        Genre::iter()
            .find(|genre| {
                genre.to_string().eq_ignore_ascii_case(wanted)
                    || format!("{:?}", genre).eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| format!("Unknown genre: {}", wanted))
    }
}

/// Narrative voice, drawn once per story from the genre's pool.
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
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Tone {
    /// Short, punchy dialogue
    #[default]
    #[display("ACTION-HEAVY (Short, punchy dialogue. Focus on kinetics.)")]
    ActionHeavy,
    /// Heavy captions revealing thoughts
    #[display("INNER-MONOLOGUE (Heavy captions revealing thoughts.)")]
    InnerMonologue,
    /// Humor as a defense mechanism
    #[display("QUIPPY (Characters use humor as a defense mechanism.)")]
    Quippy,
    /// Grand declarations
    #[display("OPERATIC (Grand, dramatic declarations and high stakes.)")]
    Operatic,
    /// Natural, relationship-focused dialogue
    #[display("CASUAL (Natural dialogue, focus on relationships/gossip.)")]
    Casual,
    /// Warm and optimistic
    #[display("WHOLESOME (Warm, gentle, optimistic.)")]
    Wholesome,
}

impl Tone {
    /// Short label, e.g. "QUIPPY".
    pub fn label(&self) -> &'static str {
        match self {
            Tone::ActionHeavy => "ACTION-HEAVY",
            Tone::InnerMonologue => "INNER-MONOLOGUE",
            Tone::Quippy => "QUIPPY",
            Tone::Operatic => "OPERATIC",
            Tone::Casual => "CASUAL",
            Tone::Wholesome => "WHOLESOME",
        }
    }
}

const ALL_TONES: &[Tone] = &[
    Tone::ActionHeavy,
    Tone::InnerMonologue,
    Tone::Quippy,
    Tone::Operatic,
    Tone::Casual,
    Tone::Wholesome,
];

const LIGHT_TONES: &[Tone] = &[Tone::Casual, Tone::Wholesome, Tone::Quippy];

const HORROR_TONES: &[Tone] = &[Tone::InnerMonologue, Tone::Operatic];
