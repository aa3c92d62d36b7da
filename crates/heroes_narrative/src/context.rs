//! Narrative context for beat generation.
//!
//! Everything the model sees when writing a page is derived here from the
//! story history, the cast and the configuration. The only reader-written
//! text that reaches the prompt is the custom premise.

use crate::{RandomSource, phase_for_page};
use derive_getters::Getters;
use heroes_core::{
    COSTAR_FALLBACK_NAME, FocusChar, HERO_FALLBACK_NAME, Page, PageKind, Persona, StoryConfig,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Probability of forcing the co-star into focus when they were not focal last page.
pub const COSTAR_FOCUS_PROBABILITY: f64 = 0.6;

/// Marker used when there is no prior story page.
pub const START_MARKER: &str = "Start the adventure.";

/// Inputs for one page's context.
#[derive(Debug, Clone, Copy)]
pub struct ContextInput<'a> {
    /// Full story history
    pub history: &'a [Page],
    /// Page being written
    pub page_number: u32,
    /// Whether the page ends in a decision
    pub is_decision: bool,
    /// Story configuration
    pub config: &'a StoryConfig,
    /// Protagonist
    pub hero: Option<&'a Persona>,
    /// Co-star, if established
    pub costar: Option<&'a Persona>,
}

/// The instruction bundle for one beat request.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct BeatContext {
    /// Complete prompt text
    prompt: String,
    /// Page being written
    page_number: u32,
    /// Whether the page ends in a decision
    is_decision: bool,
    /// Whether this is the last story page
    is_final: bool,
}

/// Builds [`BeatContext`]s.
#[derive(Clone)]
pub struct NarrativeContextBuilder {
    random: Arc<dyn RandomSource>,
    max_story_pages: u32,
}

impl std::fmt::Debug for NarrativeContextBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrativeContextBuilder")
            .field("max_story_pages", &self.max_story_pages)
            .finish()
    }
}

impl NarrativeContextBuilder {
    /// Create a builder for issues with `max_story_pages` story pages.
    pub fn new(random: Arc<dyn RandomSource>, max_story_pages: u32) -> Self {
        Self {
            random,
            max_story_pages,
        }
    }

    /// Story pages with a beat strictly before `page_number`, in page order.
    pub fn relevant_history<'a>(history: &'a [Page], page_number: u32) -> Vec<&'a Page> {
        let mut relevant: Vec<&Page> = history
            .iter()
            .filter(|page| {
                *page.kind() == PageKind::Story
                    && page.narrative().is_some()
                    && *page.index() < page_number
            })
            .collect();
        relevant.sort_by_key(|page| *page.index());
        relevant
    }

    /// Compose the prompt for one page.
    #[instrument(skip(self, input), fields(page = input.page_number, decision = input.is_decision))]
    pub fn build(&self, input: ContextInput<'_>) -> BeatContext {
        let page_number = input.page_number;
        let is_final = page_number == self.max_story_pages;
        let config = input.config;
        let language = config.language_name();

        let hero_name = input
            .hero
            .map(|hero| hero.display_name(HERO_FALLBACK_NAME))
            .unwrap_or(HERO_FALLBACK_NAME);
        let costar_name = input
            .costar
            .map(|costar| costar.display_name(COSTAR_FALLBACK_NAME))
            .unwrap_or(COSTAR_FALLBACK_NAME);

        let relevant = Self::relevant_history(input.history, page_number);
        let history_text = if relevant.is_empty() {
            START_MARKER.to_string()
        } else {
            relevant
                .iter()
                .map(|page| history_line(page))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let last_focus = relevant
            .last()
            .and_then(|page| page.narrative().as_ref())
            .map(|beat| *beat.focus_char());
        let costar_line = match input.costar {
            None => "Not yet introduced.".to_string(),
            Some(_) => {
                let mandatory = last_focus != Some(FocusChar::Friend)
                    && self.random.chance(COSTAR_FOCUS_PROBABILITY);
                if mandatory {
                    "ACTIVE and PRESENT. MANDATORY: FOCUS ON THE CO-STAR FOR THIS PANEL."
                        .to_string()
                } else {
                    "ACTIVE and PRESENT. Ensure they are woven into the scene.".to_string()
                }
            }
        };

        let core_driver = if config.genre().is_custom() {
            let premise = config.premise().trim();
            let premise = if premise.is_empty() {
                "An unpredictable original adventure."
            } else {
                premise
            };
            format!("STORY PREMISE: {}", premise)
        } else {
            format!("GENRE: {}. TONE: {}.", config.genre(), config.tone())
        };

        let mut guardrails = Vec::new();
        if !config.genre().allows_technobabble() {
            guardrails.push(
                "NO technobabble: do not mention 'quantum', 'timelines', 'dimensions' or similar jargon.",
            );
        }
        if config.genre().requires_social_stakes() {
            guardrails.push(
                "Stakes must be SOCIAL or EMOTIONAL (friendship, reputation, embarrassment), never lethal.",
            );
        }
        guardrails.push(
            "Do not reference 'the artifact' or any plot device that has not been established in PREVIOUS PANELS.",
        );
        let guardrail_text = guardrails
            .iter()
            .enumerate()
            .map(|(i, rule)| format!("{}. {}", i + 1, rule))
            .collect::<Vec<_>>()
            .join("\n");

        let mut instruction = format!(
            "Continue the story. OUTPUT TEXT MUST BE IN {}. SCENE DESCRIPTIONS MUST BE IN ENGLISH. {}",
            language, core_driver
        );
        if *config.rich_mode() {
            instruction.push_str(
                " RICH MODE: Prioritize deeper thoughts, internal monologue and descriptive captions.",
            );
        }
        if is_final {
            instruction.push_str(
                " FINAL PAGE. KARMIC CLIFFHANGER. Reference the user's early choices. Text must end with 'TO BE CONTINUED...'.",
            );
        } else if input.is_decision {
            instruction.push_str(
                " DECISION PAGE. End with a PSYCHOLOGICAL choice (Values/Risks), not just 'Go Left/Right'. Provide exactly two choices.",
            );
        } else {
            instruction.push_str(" Leave choices empty.");
        }

        let phase = phase_for_page(page_number);
        instruction.push_str(&format!(
            " PHASE: {}. {}",
            phase.name,
            phase.render(hero_name, costar_name)
        ));

        let (caption_limit, dialogue_limit) = if *config.rich_mode() {
            (35, 30)
        } else {
            (15, 12)
        };
        instruction.push_str(&format!(
            " Caption max {} words. Dialogue max {} words.",
            caption_limit, dialogue_limit
        ));

        let prompt = format!(
            "You are writing a comic book script. PAGE {page} of {total}.\n\
             TARGET LANGUAGE: {language}\n\
             CHARACTERS:\n\
             - HERO ({hero}): Active.\n\
             - CO-STAR ({costar}): {costar_line}\n\
             PREVIOUS PANELS:\n\
             {history}\n\
             GUARDRAILS:\n\
             {guardrails}\n\
             INSTRUCTION: {instruction}\n\
             Generate the next panel beat. In the scene, call the protagonist 'HERO' and the companion 'CO-STAR'.",
            page = page_number,
            total = self.max_story_pages,
            language = language,
            hero = hero_name,
            costar = costar_name,
            costar_line = costar_line,
            history = history_text,
            guardrails = guardrail_text,
            instruction = instruction,
        );

        debug!(
            prior_pages = relevant.len(),
            is_final,
            prompt_len = prompt.len(),
            "Built beat context"
        );

        BeatContext {
            prompt,
            page_number,
            is_decision: input.is_decision,
            is_final,
        }
    }
}

fn history_line(page: &Page) -> String {
    let Some(beat) = page.narrative() else {
        return String::new();
    };
    let mut line = format!(
        "[Page {}] [Focus: {}] (Caption: \"{}\")",
        page.index(),
        beat.focus_char(),
        beat.caption()
    );
    if !beat.dialogue().trim().is_empty() {
        line.push_str(&format!(" (Dialogue: \"{}\")", beat.dialogue()));
    }
    line.push_str(&format!(" (Scene: {})", beat.scene()));
    if let Some(choice) = page.resolved_choice() {
        line.push_str(&format!(" -> USER CHOICE: \"{}\"", choice));
    }
    line
}
