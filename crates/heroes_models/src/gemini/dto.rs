//! Gemini REST API data transfer objects.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Inline base64 payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GeminiInlineData {
    /// MIME type of the payload
    mime_type: String,
    /// Base64-encoded bytes
    data: String,
}

impl GeminiInlineData {
    /// Create an inline payload.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// One content part: text or an inline payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPart {
    /// Text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    /// Inline image content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiInlineData>,
}

impl GeminiPart {
    /// A text part.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    /// An inline data part.
    pub fn inline(data: GeminiInlineData) -> Self {
        Self {
            text: None,
            inline_data: Some(data),
        }
    }
}

/// A turn of content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
pub struct GeminiContent {
    /// "user" or "model"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    /// Content parts
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    /// A user turn with the given parts.
    pub fn user(parts: Vec<GeminiPart>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }
}

/// Image output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GeminiImageConfig {
    /// Aspect ratio such as "3:4"
    aspect_ratio: String,
}

impl GeminiImageConfig {
    /// Image config with the given aspect ratio.
    pub fn new(aspect_ratio: impl Into<String>) -> Self {
        Self {
            aspect_ratio: aspect_ratio.into(),
        }
    }
}

/// Generation settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into), default)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    /// Output MIME type (e.g. "application/json")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    /// OpenAPI-style schema the output must follow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    /// Image output settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_config: Option<GeminiImageConfig>,
}

impl GeminiGenerationConfig {
    /// Creates a new builder for `GeminiGenerationConfig`.
    pub fn builder() -> GeminiGenerationConfigBuilder {
        GeminiGenerationConfigBuilder::default()
    }

    /// Whether no setting is present.
    pub fn is_empty(&self) -> bool {
        self.response_mime_type.is_none()
            && self.response_schema.is_none()
            && self.image_config.is_none()
    }
}

/// `generateContent` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Conversation contents
    contents: Vec<GeminiContent>,
    /// Generation settings
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

impl GeminiRequest {
    /// Creates a new builder for `GeminiRequest`.
    pub fn builder() -> GeminiRequestBuilder {
        GeminiRequestBuilder::default()
    }
}

/// One candidate response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    /// Generated content
    #[serde(default)]
    content: Option<GeminiContent>,
    /// Why generation stopped
    #[serde(default)]
    finish_reason: Option<String>,
}

/// `generateContent` response body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Candidate responses
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}
