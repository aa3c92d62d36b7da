//! Story orchestration for Infinite Heroes.
//!
//! This crate turns a hero, a genre and a stream of reader choices into a
//! comic book:
//!
//! - [`NarrativeContextBuilder`] writes the prompt for each story beat
//! - [`StoryGenerator`] requests beats, portraits and panels
//! - [`PageOrchestrator`] schedules pages in batches and drives each one
//!   from placeholder to finished panel
//! - [`ChoiceResolver`] commits reader choices and schedules what follows
//! - [`StoryStore`] holds the story state and persists it
//!
//! # Example
//!
//! ```no_run
//! use heroes_core::{Genre, ImageData, Persona, StorySetup};
//! use heroes_narrative::{OrchestratorSettings, PageOrchestrator, SeededRandom, StoryStore};
//! use std::sync::Arc;
//!
//! # async fn example(driver: impl heroes_interface::GenerationDriver + 'static)
//! # -> heroes_error::HeroesResult<()> {
//! let orchestrator = PageOrchestrator::new(
//!     driver,
//!     StoryStore::default(),
//!     OrchestratorSettings::default(),
//!     Arc::new(SeededRandom::from_entropy()),
//! );
//!
//! let hero = Persona::new("Aria", "", ImageData::new("image/png", "..."));
//! let setup = StorySetup::builder()
//!     .hero(Some(hero))
//!     .genre(Genre::HighFantasy)
//!     .build()
//!     .unwrap();
//!
//! orchestrator.launch(setup).await?.wait().await;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod generator;
mod in_flight;
mod orchestrator;
mod phases;
mod random;
mod resolver;
mod settings;
mod store;

pub use context::{
    BeatContext, COSTAR_FOCUS_PROBABILITY, ContextInput, NarrativeContextBuilder, START_MARKER,
};
pub use generator::{
    COVER_TITLE, Cast, DEFAULT_CHOICES, PANEL_ASPECT_RATIO, PORTRAIT_ASPECT_RATIO, StoryGenerator,
    back_cover_beat, beat_schema, fallback_beat, panel_prompt, parse_beat,
};
pub use in_flight::{InFlightGuard, InFlightPages};
pub use orchestrator::{PageOrchestrator, PageOutcome, ScheduledBatch, ScheduledWork};
pub use phases::{COSTAR_TOKEN, HERO_TOKEN, NarrativePhase, PHASES, phase_for_page};
pub use random::{RandomSource, SeededRandom};
pub use resolver::ChoiceResolver;
pub use settings::{
    DEFAULT_CHOICE_DELAY, DEFAULT_IMAGE_MODEL, DEFAULT_LAUNCH_DELAY, DEFAULT_TEXT_MODEL,
    OrchestratorSettings, OrchestratorSettingsBuilder,
};
pub use store::{DEFAULT_SAVE_KEY, MutationOutcome, StoryMutation, StoryState, StoryStore};
