// Live Gemini API tests. Run with `--features api` and GEMINI_API_KEY set.

use heroes_core::{GenerateRequest, Input};
use heroes_interface::GenerationDriver;
use heroes_models::GeminiClient;

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_gemini_json_beat_roundtrip() {
    let _ = dotenvy::dotenv();

    let client = GeminiClient::from_env("gemini-2.5-flash").expect("Failed to create client");
    let request = GenerateRequest::builder()
        .model("gemini-2.5-flash")
        .inputs(vec![Input::Text(
            "Return a JSON object with a single field \"caption\" describing a sunrise."
                .to_string(),
        )])
        .response_mime_type(Some("application/json".to_string()))
        .build()
        .expect("Failed to build request");

    let response = client.generate(&request).await.expect("Generation failed");
    let text = response.joined_text().expect("Response should contain text");
    let value: serde_json::Value = serde_json::from_str(&text).expect("Response should be JSON");
    assert!(value.get("caption").is_some());
}

#[tokio::test]
async fn test_connection_failure_does_not_require_reauth() {
    let client = GeminiClient::new("not-a-real-key", "gemini-2.5-flash")
        .expect("Failed to create client")
        .with_base_url("http://127.0.0.1:9");
    let request = GenerateRequest::builder()
        .model("gemini-2.5-flash")
        .inputs(vec![Input::Text("hi".to_string())])
        .build()
        .expect("Failed to build request");

    // Nothing listens on the discard port
    let err = client.generate(&request).await.unwrap_err();
    assert!(err.transport_kind().is_some());
    assert!(!err.requires_reauth());
}
