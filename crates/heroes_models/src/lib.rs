//! Generation backends for Infinite Heroes.
//!
//! Currently provides a Gemini REST client implementing
//! [`GenerationDriver`](heroes_interface::GenerationDriver): JSON-schema
//! constrained text output for beats and inline image output for portraits
//! and panels.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod gemini;

pub use gemini::{
    API_KEY_ENV, DEFAULT_BASE_URL, GeminiCandidate, GeminiClient, GeminiContent,
    GeminiGenerationConfig, GeminiImageConfig, GeminiInlineData, GeminiPart, GeminiRequest,
    GeminiResponse, conversion,
};
