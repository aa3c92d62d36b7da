//! Generation requests for beats, portraits and panels.
//!
//! [`StoryGenerator`] shapes each request for the underlying
//! [`GenerationDriver`] and normalizes what comes back.

use crate::BeatContext;
use heroes_core::{
    Beat, FocusChar, GenerateRequest, ImageData, Input, PageKind, Persona, StoryConfig,
};
use heroes_error::{HeroesResult, MalformedResponseError, PersonaGenerationError};
use heroes_interface::GenerationDriver;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

/// Aspect ratio of story and cover panels.
pub const PANEL_ASPECT_RATIO: &str = "3:4";

/// Aspect ratio of character portraits.
pub const PORTRAIT_ASPECT_RATIO: &str = "1:1";

/// Choices substituted when a decision beat arrives with fewer than two.
pub const DEFAULT_CHOICES: [&str; 2] = ["Option A", "Option B"];

/// Title lettered on the cover, translated into the story language by the model.
pub const COVER_TITLE: &str = "INFINITE HEROES";

/// Response schema for beat requests.
pub fn beat_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "caption": { "type": "STRING" },
            "dialogue": { "type": "STRING" },
            "scene": { "type": "STRING" },
            "focus_char": { "type": "STRING", "enum": ["hero", "friend", "other"] },
            "choices": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["caption", "scene", "focus_char", "choices"]
    })
}

/// Beat substituted when the model's beat cannot be parsed.
pub fn fallback_beat(page_number: u32) -> Beat {
    Beat::new(
        "The story continues...",
        "",
        format!("Generic scene for page {}.", page_number),
        FocusChar::Hero,
        Vec::new(),
    )
}

/// Fixed beat for the back cover.
pub fn back_cover_beat() -> Beat {
    Beat::new("", "", "Thematic teaser image", FocusChar::Other, Vec::new())
}

#[derive(Debug, Deserialize)]
struct RawBeat {
    caption: String,
    #[serde(default)]
    dialogue: Option<String>,
    scene: String,
    #[serde(default)]
    focus_char: Value,
    #[serde(default)]
    choices: Option<Vec<String>>,
}

fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse and normalize a beat response.
///
/// Code fences are ignored. A missing caption or scene is malformed. Unknown
/// focus values become the hero. Non-decision pages never carry choices; a
/// decision page that is not the finale gets exactly two.
///
/// # Errors
///
/// Returns [`MalformedResponseError`] if the text is not a beat.
pub fn parse_beat(text: &str, is_decision: bool, is_final: bool) -> HeroesResult<Beat> {
    let raw: RawBeat = serde_json::from_str(strip_fences(text))
        .map_err(|e| MalformedResponseError::new(format!("Beat is not valid JSON: {}", e)))?;

    let focus_char = raw
        .focus_char
        .as_str()
        .and_then(|value| value.parse::<FocusChar>().ok())
        .unwrap_or_default();

    let mut choices: Vec<String> = raw
        .choices
        .unwrap_or_default()
        .into_iter()
        .map(|choice| choice.trim().to_string())
        .filter(|choice| !choice.is_empty())
        .collect();
    if !is_decision {
        choices.clear();
    } else if !is_final && choices.len() < 2 {
        choices = DEFAULT_CHOICES.iter().map(|c| c.to_string()).collect();
    } else {
        choices.truncate(2);
    }

    Ok(Beat::new(
        raw.caption,
        raw.dialogue.unwrap_or_default(),
        raw.scene,
        focus_char,
        choices,
    ))
}

/// Reference images available to a panel request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cast<'a> {
    /// Protagonist
    pub hero: Option<&'a Persona>,
    /// Co-star, if established
    pub costar: Option<&'a Persona>,
}

/// Issues generation requests for one story.
#[derive(Debug, Clone)]
pub struct StoryGenerator<D> {
    driver: D,
    text_model: String,
    image_model: String,
}

impl<D: GenerationDriver> StoryGenerator<D> {
    /// Create a generator over `driver`.
    pub fn new(driver: D, text_model: impl Into<String>, image_model: impl Into<String>) -> Self {
        Self {
            driver,
            text_model: text_model.into(),
            image_model: image_model.into(),
        }
    }

    /// The underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Request the beat for one page.
    ///
    /// # Errors
    ///
    /// Transport failures pass through. Unparseable output is a
    /// [`MalformedResponseError`].
    #[instrument(
        skip(self, context),
        fields(page = context.page_number(), model = %self.text_model)
    )]
    pub async fn request_beat(&self, context: &BeatContext) -> HeroesResult<Beat> {
        let request = GenerateRequest::builder()
            .model(self.text_model.clone())
            .inputs(vec![Input::Text(context.prompt().clone())])
            .response_mime_type(Some("application/json".to_string()))
            .response_schema(Some(beat_schema()))
            .build()
            .map_err(|e| MalformedResponseError::new(format!("Invalid beat request: {}", e)))?;

        let response = self.driver.generate(&request).await?;
        let text = response
            .joined_text()
            .ok_or_else(|| MalformedResponseError::new("Beat response contained no text"))?;

        let beat = parse_beat(&text, *context.is_decision(), *context.is_final())?;
        debug!(
            focus = %beat.focus_char(),
            choices = beat.choices().len(),
            "Beat received"
        );
        Ok(beat)
    }

    /// Synthesize a portrait from a description.
    ///
    /// # Errors
    ///
    /// Credential failures stay transport errors so they can prompt for a new
    /// key. Everything else becomes a [`PersonaGenerationError`].
    #[instrument(skip(self, description), fields(model = %self.image_model))]
    pub async fn request_portrait(&self, description: &str) -> HeroesResult<ImageData> {
        let prompt = format!(
            "STYLE: Masterpiece comic book character sheet, detailed ink, neutral background. FULL BODY. Character: {}",
            description
        );
        let request = GenerateRequest::builder()
            .model(self.image_model.clone())
            .inputs(vec![Input::Text(prompt)])
            .aspect_ratio(Some(PORTRAIT_ASPECT_RATIO.to_string()))
            .build()
            .map_err(|e| PersonaGenerationError::new(format!("Invalid portrait request: {}", e)))?;

        let response = match self.driver.generate(&request).await {
            Ok(response) => response,
            Err(e) if e.requires_reauth() => return Err(e),
            Err(e) => {
                warn!(error = %e, "Portrait request failed");
                return Err(PersonaGenerationError::new(e.to_string()).into());
            }
        };

        response
            .first_image()
            .cloned()
            .ok_or_else(|| {
                PersonaGenerationError::new("Portrait response contained no image").into()
            })
    }

    /// Render the panel for a page.
    ///
    /// # Errors
    ///
    /// Transport failures pass through. A response without an image is a
    /// [`MalformedResponseError`].
    #[instrument(skip(self, beat, cast, config), fields(kind = ?kind, model = %self.image_model))]
    pub async fn request_panel(
        &self,
        kind: PageKind,
        beat: &Beat,
        cast: Cast<'_>,
        config: &StoryConfig,
    ) -> HeroesResult<ImageData> {
        let mut inputs = Vec::new();
        if let Some(hero) = cast.hero {
            inputs.push(Input::Text("REFERENCE 1 [HERO]:".to_string()));
            inputs.push(Input::Image(hero.portrait().clone()));
        }
        if let Some(costar) = cast.costar {
            inputs.push(Input::Text("REFERENCE 2 [CO-STAR]:".to_string()));
            inputs.push(Input::Image(costar.portrait().clone()));
        }
        inputs.push(Input::Text(panel_prompt(kind, beat, config)));

        let request = GenerateRequest::builder()
            .model(self.image_model.clone())
            .inputs(inputs)
            .aspect_ratio(Some(PANEL_ASPECT_RATIO.to_string()))
            .build()
            .map_err(|e| MalformedResponseError::new(format!("Invalid panel request: {}", e)))?;

        let response = self.driver.generate(&request).await?;
        response
            .first_image()
            .cloned()
            .ok_or_else(|| MalformedResponseError::new("Panel response contained no image").into())
    }
}

/// Text portion of a panel request.
pub fn panel_prompt(kind: PageKind, beat: &Beat, config: &StoryConfig) -> String {
    let language = config.language_name();
    let mut prompt = format!(
        "STYLE: {} comic book art, detailed ink, vibrant colors. ",
        config.genre().style_era()
    );
    match kind {
        PageKind::Cover => {
            prompt.push_str(&format!(
                "TYPE: Comic Book Cover. TITLE: \"{}\" (OR LOCALIZED TRANSLATION IN {}). \
                 Main visual: Dynamic action shot of [HERO] (Use REFERENCE 1).",
                COVER_TITLE,
                language.to_uppercase()
            ));
        }
        PageKind::BackCover => {
            prompt.push_str(
                "TYPE: Comic Back Cover. FULL PAGE VERTICAL ART. Dramatic teaser. \
                 Text: \"NEXT ISSUE SOON\".",
            );
        }
        PageKind::Story => {
            prompt.push_str(&format!("TYPE: Vertical comic panel. SCENE: {}. ", beat.scene()));
            match beat.focus_char() {
                FocusChar::Hero => prompt.push_str("FOCUS: the HERO (Reference 1). "),
                FocusChar::Friend => prompt.push_str("FOCUS: the CO-STAR (Reference 2). "),
                FocusChar::Other => {}
            }
            prompt.push_str(
                "INSTRUCTIONS: Maintain strict character likeness. \
                 If scene mentions 'HERO', use REFERENCE 1. \
                 If scene mentions 'CO-STAR', use REFERENCE 2. ",
            );
            prompt.push_str(
                "IMPORTANT: DO NOT DRAW SPEECH BUBBLES OR CAPTION BOXES. \
                 GENERATE A CLEAN ILLUSTRATION ONLY.",
            );
        }
    }
    prompt.trim_end().to_string()
}
