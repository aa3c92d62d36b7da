//! Request and response types for generation backends.

use crate::ImageData;
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One part of a multi-part generation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Input {
    /// Plain text
    Text(String),
    /// Inline reference image
    Image(ImageData),
}

/// One part of a generation output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Output {
    /// Generated text
    Text(String),
    /// Generated inline image
    Image(ImageData),
}

/// Generic generation request.
///
/// # Examples
///
/// ```
/// use heroes_core::{GenerateRequest, Input};
///
/// let request = GenerateRequest::builder()
///     .model("gemini-2.5-flash")
///     .inputs(vec![Input::Text("Hello!".to_string())])
///     .response_mime_type(Some("application/json".to_string()))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.inputs().len(), 1);
/// assert!(request.aspect_ratio().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into))]
pub struct GenerateRequest {
    /// Model identifier
    model: String,
    /// Ordered input parts
    #[builder(default)]
    inputs: Vec<Input>,
    /// Required output MIME type (e.g. "application/json")
    #[builder(default)]
    response_mime_type: Option<String>,
    /// JSON schema the output must satisfy
    #[builder(default)]
    response_schema: Option<serde_json::Value>,
    /// Aspect ratio for image output, e.g. "3:4"
    #[builder(default)]
    aspect_ratio: Option<String>,
}

impl GenerateRequest {
    /// Creates a new builder for `GenerateRequest`.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }

    /// All text parts joined with newlines.
    pub fn prompt_text(&self) -> String {
        self.inputs
            .iter()
            .filter_map(|input| match input {
                Input::Text(text) => Some(text.as_str()),
                Input::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of inline images attached.
    pub fn image_count(&self) -> usize {
        self.inputs
            .iter()
            .filter(|input| matches!(input, Input::Image(_)))
            .count()
    }
}

/// The unified response object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GenerateResponse {
    /// The generated outputs from the model
    pub outputs: Vec<Output>,
}

impl GenerateResponse {
    /// Response with a single text output.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            outputs: vec![Output::Text(text.into())],
        }
    }

    /// Response with a single image output.
    pub fn image(image: ImageData) -> Self {
        Self {
            outputs: vec![Output::Image(image)],
        }
    }

    /// Concatenated text outputs, or `None` if there are none.
    pub fn joined_text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .outputs
            .iter()
            .filter_map(|output| match output {
                Output::Text(text) => Some(text.as_str()),
                Output::Image(_) => None,
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.concat())
        }
    }

    /// The first image output.
    pub fn first_image(&self) -> Option<&ImageData> {
        self.outputs.iter().find_map(|output| match output {
            Output::Image(image) => Some(image),
            Output::Text(_) => None,
        })
    }
}
