//! Gemini REST API integration.

mod client;
pub mod conversion;
mod dto;

pub use client::{API_KEY_ENV, DEFAULT_BASE_URL, GeminiClient};
pub use dto::{
    GeminiCandidate, GeminiContent, GeminiGenerationConfig, GeminiImageConfig, GeminiInlineData,
    GeminiPart, GeminiRequest, GeminiResponse,
};
