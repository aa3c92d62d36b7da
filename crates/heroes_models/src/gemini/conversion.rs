//! Type conversions between Infinite Heroes and Gemini types.

use super::dto::{
    GeminiContent, GeminiGenerationConfig, GeminiImageConfig, GeminiInlineData, GeminiPart,
    GeminiRequest, GeminiResponse,
};
use heroes_core::{GenerateRequest, GenerateResponse, ImageData, Input, Output};
use heroes_error::{HeroesResult, MalformedResponseError};

/// Converts a GenerateRequest into a Gemini request body.
pub fn to_gemini_request(request: &GenerateRequest) -> HeroesResult<GeminiRequest> {
    let parts = request
        .inputs()
        .iter()
        .map(|input| match input {
            Input::Text(text) => GeminiPart::from_text(text.clone()),
            Input::Image(image) => GeminiPart::inline(GeminiInlineData::new(
                image.mime_type().clone(),
                image.data().clone(),
            )),
        })
        .collect();

    let generation_config = GeminiGenerationConfig::builder()
        .response_mime_type(request.response_mime_type().clone())
        .response_schema(request.response_schema().clone())
        .image_config(request.aspect_ratio().as_ref().map(GeminiImageConfig::new))
        .build()
        .map_err(|e| {
            MalformedResponseError::new(format!("Failed to build generation config: {}", e))
        })?;

    let mut builder = GeminiRequest::builder();
    builder.contents(vec![GeminiContent::user(parts)]);
    if !generation_config.is_empty() {
        builder.generation_config(Some(generation_config));
    }

    Ok(builder.build().map_err(|e| {
        MalformedResponseError::new(format!("Failed to build Gemini request: {}", e))
    })?)
}

/// Converts the first candidate of a Gemini response into outputs.
///
/// A response with no candidates yields no outputs; callers decide whether
/// that is acceptable.
pub fn from_gemini_response(response: &GeminiResponse) -> GenerateResponse {
    let outputs = response
        .candidates()
        .first()
        .and_then(|candidate| candidate.content().as_ref())
        .map(|content| {
            content
                .parts()
                .iter()
                .filter_map(|part| {
                    if let Some(data) = part.inline_data() {
                        Some(Output::Image(ImageData::new(
                            data.mime_type().clone(),
                            data.data().clone(),
                        )))
                    } else {
                        part.text().as_ref().map(|text| Output::Text(text.clone()))
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    GenerateResponse { outputs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_with_image_parts_and_aspect_ratio() {
        let request = GenerateRequest::builder()
            .model("gemini-2.5-flash-image")
            .inputs(vec![
                Input::Text("REFERENCE 1 [HERO]:".to_string()),
                Input::Image(ImageData::new("image/png", "AAAA")),
                Input::Text("TYPE: Vertical comic panel.".to_string()),
            ])
            .aspect_ratio(Some("3:4".to_string()))
            .build()
            .unwrap();

        let body = serde_json::to_value(to_gemini_request(&request).unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"text": "REFERENCE 1 [HERO]:"},
                        {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
                        {"text": "TYPE: Vertical comic panel."}
                    ]
                }],
                "generationConfig": {"imageConfig": {"aspectRatio": "3:4"}}
            })
        );
    }

    #[test]
    fn test_request_without_settings_omits_generation_config() {
        let request = GenerateRequest::builder()
            .model("gemini-2.5-flash")
            .inputs(vec![Input::Text("hi".to_string())])
            .build()
            .unwrap();

        let body = serde_json::to_value(to_gemini_request(&request).unwrap()).unwrap();
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_request_with_schema() {
        let schema = json!({"type": "OBJECT"});
        let request = GenerateRequest::builder()
            .model("gemini-2.5-flash")
            .inputs(vec![Input::Text("beat".to_string())])
            .response_mime_type(Some("application/json".to_string()))
            .response_schema(Some(schema.clone()))
            .build()
            .unwrap();

        let body = serde_json::to_value(to_gemini_request(&request).unwrap()).unwrap();
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            json!("application/json")
        );
        assert_eq!(body["generationConfig"]["responseSchema"], schema);
    }

    #[test]
    fn test_response_text_and_image_parts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Here is your panel"},
                        {"inlineData": {"mimeType": "image/png", "data": "iVBOR"}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        let converted = from_gemini_response(&response);
        assert_eq!(converted.joined_text().as_deref(), Some("Here is your panel"));
        assert_eq!(
            converted.first_image(),
            Some(&ImageData::new("image/png", "iVBOR"))
        );
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let response: GeminiResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        assert!(from_gemini_response(&response).outputs.is_empty());
    }
}
