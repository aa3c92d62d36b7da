//! Infinite Heroes - choose-your-path comic books, generated page by page.
//!
//! A story starts from a hero portrait and a genre. The cover and the first
//! pages are generated straight away; at the decision page the reader picks a
//! path and the rest of the issue is written around that choice.
//!
//! # Architecture
//!
//! - `heroes_error` - Error types
//! - `heroes_core` - Pages, beats, personas, genres and the page layout
//! - `heroes_interface` - Generation, persistence and observer traits
//! - `heroes_rate_limit` - Request quotas around any generation driver
//! - `heroes_models` - Gemini REST client
//! - `heroes_storage` - Saves, share tokens, export and portrait loading
//! - `heroes_narrative` - Context builder, orchestrator and choice resolver
//!
//! This crate (`infinite_heroes`) adds layered configuration, a filesystem
//! backed [`StoryRuntime`] and the `infinite-heroes` command-line binary, and
//! re-exports the rest for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod observer;
mod runtime;

pub use config::{HeroesConfig, ModelsConfig, StorageConfig, TimingConfig};
pub use observer::{ConsoleObserver, reauth_prompt};
pub use runtime::{HeroesDriver, StoryRuntime, finished_story_pages};

pub use heroes_core::*;
pub use heroes_error::*;
pub use heroes_interface::*;
pub use heroes_models::{GeminiClient, API_KEY_ENV};
pub use heroes_narrative::*;
pub use heroes_rate_limit::*;
pub use heroes_storage::*;
