//! Error types for Infinite Heroes.
//!
//! This crate provides the foundation error types used throughout the workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use heroes_error::{HeroesResult, ValidationError, ValidationErrorKind};
//!
//! fn start() -> HeroesResult<()> {
//!     Err(ValidationError::new(ValidationErrorKind::MissingHero))?
//! }
//!
//! assert!(start().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod json;
mod malformed;
mod persona;
mod storage;
mod transport;
mod validation;

pub use config::ConfigError;
pub use error::{HeroesError, HeroesErrorKind, HeroesResult};
pub use json::JsonError;
pub use malformed::MalformedResponseError;
pub use persona::PersonaGenerationError;
pub use storage::{StorageError, StorageErrorKind};
pub use transport::{TransportError, TransportErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
