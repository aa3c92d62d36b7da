//! Character personas.

use crate::ImageData;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Title used when the hero has no name.
pub const HERO_FALLBACK_NAME: &str = "The Hero";

/// Title used when the co-star has no name.
pub const COSTAR_FALLBACK_NAME: &str = "The Sidekick";

/// A named character with a reference portrait.
///
/// The portrait biases every panel toward a consistent look for the
/// character; the description seeds portrait generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Persona {
    /// Display name (may be empty)
    #[serde(default)]
    name: String,
    /// Text description used as a generation seed
    #[serde(default)]
    description: String,
    /// Reference portrait
    portrait: ImageData,
}

impl Persona {
    /// Create a persona.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        portrait: ImageData,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            portrait,
        }
    }

    /// The name, or `fallback` when the name is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use heroes_core::{ImageData, Persona, HERO_FALLBACK_NAME};
    ///
    /// let hero = Persona::new("  ", "", ImageData::new("image/png", ""));
    /// assert_eq!(hero.display_name(HERO_FALLBACK_NAME), "The Hero");
    /// ```
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        let name = self.name.trim();
        if name.is_empty() { fallback } else { name }
    }

    /// Fill a blank name with `fallback`.
    pub fn with_default_name(mut self, fallback: &str) -> Self {
        if self.name.trim().is_empty() {
            self.name = fallback.to_string();
        }
        self
    }
}
