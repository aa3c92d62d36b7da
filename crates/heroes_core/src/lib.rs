//! Core data types for Infinite Heroes.
//!
//! This crate provides the story model shared by every other crate: pages,
//! beats, personas, the story configuration, and the generic generation
//! request/response types used to talk to a generation backend.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod beat;
mod genre;
mod language;
mod layout;
mod media;
mod page;
mod persona;
mod request;
mod saved;
mod story;
mod telemetry;

pub use beat::{Beat, BeatBuilder, FocusChar};
pub use genre::{Genre, Tone};
pub use language::{LANGUAGES, Language, language_name};
pub use layout::{StoryLayout, StoryLayoutBuilder};
pub use media::ImageData;
pub use page::{Page, PageKind, PageStatus, PageUpdate};
pub use persona::{COSTAR_FALLBACK_NAME, HERO_FALLBACK_NAME, Persona};
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateResponse, Input, Output};
pub use saved::{SavedStory, SavedStoryBuilder};
pub use story::{StoryConfig, StoryConfigBuilder, StorySetup, StorySetupBuilder};
pub use telemetry::init_tracing;
