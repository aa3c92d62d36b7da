//! Trait definitions for Infinite Heroes.
//!
//! The orchestrator depends only on these seams: a generation capability,
//! a key-value persistence backend, and observers that render or log story
//! changes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{GenerationDriver, StoryObserver, StoryPersistence};
