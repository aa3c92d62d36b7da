//! Persistence and interchange for Infinite Heroes stories.
//!
//! - [`FileSystemStateStore`] and [`InMemoryStateStore`] implement
//!   [`StoryPersistence`](heroes_interface::StoryPersistence)
//! - [`SharedStory`] encodes a story's beats into a URL-safe share token
//! - [`ExportDocument`] lays out finished pages as a printable document
//! - [`load_portrait`] turns an image file into a persona

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod export;
mod filesystem;
mod memory;
mod portrait;
mod share;

pub use export::{
    CaptionBox, DialogueBubble, EXPORT_PAGE_HEIGHT, EXPORT_PAGE_WIDTH, ExportDocument, ExportPage,
};
pub use filesystem::FileSystemStateStore;
pub use memory::InMemoryStateStore;
pub use portrait::{load_portrait, mime_type_for_path};
pub use share::{SharedBeat, SharedStory};
