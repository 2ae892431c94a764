//! Google Generative AI (Gemini) client

use crate::{
    error::{Error, Result},
    providers::{TextGenerator, get_api_key},
    types::{FALLBACK_RESPONSE, GenerateRequest},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Gemini `generateContent` client
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    /// Public Generative Language API root
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    /// Create a client. A missing or empty key is accepted here; every
    /// request then fails with [`Error::MissingApiKey`].
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::new(get_api_key(None).ok())
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether a credential is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(Error::MissingApiKey)?;

        let body = build_request(request);
        let url = self.endpoint(&request.model);
        tracing::debug!(
            model = %request.model,
            turns = request.turn_count(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(status = status.as_u16(), bytes = text.len(), "generateContent replied");

        decode_reply(status.as_u16(), &text)
    }
}

/// Turn a status and raw body into the reply text or an error
fn decode_reply(status: u16, body: &str) -> Result<String> {
    if !(200..300).contains(&status) {
        return Err(parse_error(status, body));
    }
    let parsed: GeminiResponse = serde_json::from_str(body)?;
    Ok(extract_text(parsed))
}

fn build_request(request: &GenerateRequest) -> GeminiRequest {
    let mut contents: Vec<GeminiContent> = request
        .history
        .iter()
        .map(|entry| GeminiContent {
            role: Some(entry.role.as_str().to_string()),
            parts: vec![GeminiPart {
                text: entry.text.clone(),
            }],
        })
        .collect();

    contents.push(GeminiContent {
        role: Some("user".to_string()),
        parts: vec![GeminiPart {
            text: request.prompt.clone(),
        }],
    });

    GeminiRequest {
        contents,
        system_instruction: Some(GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: request.system_instruction.clone(),
            }],
        }),
        generation_config: Some(GeminiGenerationConfig {
            temperature: Some(request.temperature),
        }),
    }
}

/// Concatenate the text parts of the first candidate, or fall back.
fn extract_text(response: GeminiResponse) -> String {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|p| !p.thought)
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        FALLBACK_RESPONSE.to_string()
    } else {
        text
    }
}

fn parse_error(status: u16, body: &str) -> Error {
    match serde_json::from_str::<GeminiErrorResponse>(body) {
        Ok(err) => Error::api(status, err.error.message),
        Err(_) if body.trim().is_empty() => Error::api(status, "empty error body"),
        Err(_) => Error::api(status, body.trim()),
    }
}

// Request types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

// Response types

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HistoryEntry, Role};

    fn sample_request() -> GenerateRequest {
        GenerateRequest {
            model: "gemini-test".into(),
            history: vec![
                HistoryEntry::new(Role::User, "Topic: A\nPerspective: B"),
                HistoryEntry::new(Role::Model, "### Evaluation\n\nGood."),
            ],
            prompt: "TOPIC/QUESTION: C".into(),
            system_instruction: "Be Socratic.".into(),
            temperature: 0.5,
        }
    }

    fn parse(body: &str) -> GeminiResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_request_shape() {
        let value = serde_json::to_value(build_request(&sample_request())).unwrap();

        let contents = value["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], "### Evaluation\n\nGood.");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "TOPIC/QUESTION: C");

        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "Be Socratic.");
        assert_eq!(value["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn test_request_without_history() {
        let mut request = sample_request();
        request.history.clear();
        let value = serde_json::to_value(build_request(&request)).unwrap();
        assert_eq!(value["contents"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_extract_concatenates_parts() {
        let response = parse(
            r####"{"candidates":[{"content":{"role":"model","parts":[{"text":"### Evaluation\n"},{"text":"Nice."}]}}]}"####,
        );
        assert_eq!(extract_text(response), "### Evaluation\nNice.");
    }

    #[test]
    fn test_extract_skips_thought_parts() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"hmm","thought":true},{"text":"Answer"}]}}]}"#,
        );
        assert_eq!(extract_text(response), "Answer");
    }

    #[test]
    fn test_extract_only_first_candidate() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"one"}]}},{"content":{"parts":[{"text":"two"}]}}]}"#,
        );
        assert_eq!(extract_text(response), "one");
    }

    #[test]
    fn test_empty_text_falls_back() {
        let response = parse(r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#);
        assert_eq!(extract_text(response), FALLBACK_RESPONSE);
    }

    #[test]
    fn test_missing_candidates_falls_back() {
        let response = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        assert_eq!(extract_text(response), FALLBACK_RESPONSE);
    }

    #[test]
    fn test_candidate_without_content_falls_back() {
        let response = parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert_eq!(extract_text(response), FALLBACK_RESPONSE);
    }

    #[test]
    fn test_parse_structured_error() {
        let err = parse_error(
            400,
            r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#,
        );
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_plain_error() {
        let err = parse_error(502, "Bad Gateway\n");
        assert!(matches!(&err, Error::Api { status: 502, message } if message == "Bad Gateway"));
    }

    #[test]
    fn test_decode_reply_success() {
        let text = decode_reply(200, r#"{"candidates":[{"content":{"parts":[{"text":"Hi"}]}}]}"#);
        assert_eq!(text.unwrap(), "Hi");
    }

    #[test]
    fn test_decode_reply_undecodable_body() {
        let err = decode_reply(200, "<html>proxy page</html>").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert_eq!(err.kind(), crate::ErrorKind::Transport);
    }

    #[test]
    fn test_decode_reply_error_status() {
        let err = decode_reply(503, "").unwrap_err();
        assert!(matches!(&err, Error::Api { status: 503, message } if message == "empty error body"));
    }

    #[test]
    fn test_endpoint_trims_slash() {
        let client = GeminiClient::new(Some("k".into())).with_base_url("http://localhost:1234/v1beta/");
        assert_eq!(
            client.endpoint("gemini-x"),
            "http://localhost:1234/v1beta/models/gemini-x:generateContent"
        );
    }

    #[test]
    fn test_empty_key_counts_as_missing() {
        assert!(!GeminiClient::new(Some(String::new())).has_api_key());
        assert!(GeminiClient::new(Some("key".into())).has_api_key());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        // Port 9 (discard) would produce an Http error if a request were attempted.
        let client = GeminiClient::new(None).with_base_url("http://127.0.0.1:9");
        let result = client.generate(&sample_request()).await;
        assert!(matches!(result, Err(Error::MissingApiKey)));
    }
}
