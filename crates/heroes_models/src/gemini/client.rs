//! Gemini REST API client.

use super::{GeminiResponse, conversion};
use async_trait::async_trait;
use heroes_core::{GenerateRequest, GenerateResponse};
use heroes_error::{
    HeroesResult, MalformedResponseError, TransportError, TransportErrorKind,
};
use heroes_interface::GenerationDriver;
use reqwest::Client;
use tracing::{debug, instrument, warn};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Public Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini `generateContent` client.
///
/// The model named in each request wins over the client's default model, so
/// one client serves both the text and the image model.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Creates a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns an `AuthInvalid` transport error if the key is blank.
    #[instrument(skip_all, fields(model = %model.as_ref()))]
    pub fn new(api_key: impl Into<String>, model: impl AsRef<str>) -> HeroesResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TransportError::new(
                TransportErrorKind::AuthInvalid,
                "API key is empty",
            )
            .into());
        }

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.as_ref().to_string(),
        })
    }

    /// Creates a client reading the key from `GEMINI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an `AuthInvalid` transport error if the variable is unset.
    pub fn from_env(model: impl AsRef<str>) -> HeroesResult<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|e| {
            TransportError::new(
                TransportErrorKind::AuthInvalid,
                format!("{} not set: {}", API_KEY_ENV, e),
            )
        })?;
        Self::new(api_key, model)
    }

    /// Override the API base URL (useful for proxies and tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// `generateContent` URL for a model.
    pub fn endpoint(&self, model: &str) -> String {
        let model = if model.is_empty() { &self.model } else { model };
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerationDriver for GeminiClient {
    #[instrument(skip(self, req), fields(model = %req.model(), images = req.image_count()))]
    async fn generate(&self, req: &GenerateRequest) -> HeroesResult<GenerateResponse> {
        let body = conversion::to_gemini_request(req)?;
        let url = self.endpoint(req.model());
        debug!(url = %url, "Sending Gemini API request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::classify(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let error = TransportError::new(
                TransportErrorKind::from_status(status.as_u16(), &error_text),
                format!("HTTP {}: {}", status.as_u16(), error_text),
            );
            warn!(status = status.as_u16(), kind = %error.kind, "Gemini API error");
            return Err(error.into());
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            MalformedResponseError::new(format!("Failed to parse Gemini response: {}", e))
        })?;

        let converted = conversion::from_gemini_response(&gemini_response);
        debug!(outputs = converted.outputs.len(), "Gemini response converted");
        Ok(converted)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_auth_invalid() {
        let err = GeminiClient::new("  ", "gemini-2.5-flash").unwrap_err();
        assert_eq!(err.transport_kind(), Some(TransportErrorKind::AuthInvalid));
        assert!(err.requires_reauth());
    }

    #[test]
    fn test_endpoint_uses_request_model() {
        let client = GeminiClient::new("key", "gemini-2.5-flash")
            .unwrap()
            .with_base_url("http://localhost:8080/v1beta/");
        assert_eq!(
            client.endpoint("gemini-2.5-flash-image"),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
        assert_eq!(
            client.endpoint(""),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
