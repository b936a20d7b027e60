use crate::config::{LlmConfig, API_KEY_ENV};
use crate::llm::providers::{http_client, status_error};
use crate::llm::{Completion, LlmError, TextGenerator};
use crate::prompt::Prompt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Generative Language API (`generateContent`).
pub struct GeminiProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    temperature: Option<f32>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize, Debug)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl From<GenerateContentResponse> for Completion {
    fn from(response: GenerateContentResponse) -> Self {
        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
                .map(|reason| format!("prompt blocked: {}", reason));
            return Completion::empty(reason);
        };

        Completion {
            parts: candidate
                .content
                .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
                .unwrap_or_default(),
            finish_reason: candidate.finish_reason,
        }
    }
}

impl GeminiProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            LlmError::ConfigError(format!(
                "API key is required for the gemini provider (set {})",
                API_KEY_ENV
            ))
        })?;

        let api_url = config.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            api_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            client: http_client(config)?,
            endpoint,
            api_key,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(&self, prompt: &Prompt) -> Result<Completion, LlmError> {
        // One user turn holding the instructions and the question as two parts
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: prompt.parts().into_iter().map(|text| Part { text }).collect(),
            }],
            generation_config: self.temperature.map(|temperature| GenerationConfig { temperature }),
        };

        info!("Sending request to Gemini: {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            let err = status_error("Gemini", response).await;
            error!("{}", err);
            return Err(err);
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| LlmError::ResponseError(format!("Failed to read response body: {}", e)))?;

        debug!("Raw response from Gemini: {}", response_text);

        let parsed: GenerateContentResponse = serde_json::from_str(&response_text).map_err(|e| {
            LlmError::ResponseError(format!("Failed to parse Gemini response: {}", e))
        })?;

        Ok(parsed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{build_prompt, PROMPT_TEMPLATE};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> LlmConfig {
        LlmConfig {
            backend: "gemini".to_string(),
            model: "gemini-pro".to_string(),
            api_key: Some("test-key".to_string()),
            api_url: Some(server.uri()),
            temperature: None,
            request_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_generate_content_success() {
        let mock_server = MockServer::start().await;
        let question = "How many apartments are in each building?";

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-pro:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{
                    "role": "user",
                    "parts": [{ "text": PROMPT_TEMPLATE }, { "text": question }]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{ "text": "```sql\nSELECT building_id, COUNT(*) FROM Apartments GROUP BY building_id;\n```" }]
                    },
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = GeminiProvider::new(&config_for(&mock_server)).unwrap();
        let completion = provider
            .generate(&build_prompt(PROMPT_TEMPLATE, question))
            .await
            .unwrap();

        assert_eq!(completion.finish_reason.as_deref(), Some("STOP"));
        assert!(completion.into_text().unwrap().contains("GROUP BY building_id"));
    }

    #[tokio::test]
    async fn test_blocked_prompt_has_no_text() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&mock_server)
            .await;

        let provider = GeminiProvider::new(&config_for(&mock_server)).unwrap();
        let completion = provider
            .generate(&build_prompt(PROMPT_TEMPLATE, "drop everything"))
            .await
            .unwrap();

        let err = completion.into_text().unwrap_err();
        assert!(err.to_string().contains("prompt blocked: SAFETY"));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&mock_server)
            .await;

        let provider = GeminiProvider::new(&config_for(&mock_server)).unwrap();
        let result = provider.generate(&build_prompt(PROMPT_TEMPLATE, "")).await;

        match result {
            Err(LlmError::ResponseError(msg)) => {
                assert!(msg.contains("403"));
                assert!(msg.contains("API key not valid"));
            }
            other => panic!("expected response error, got {:?}", other),
        }
    }

    #[test]
    fn test_api_key_required() {
        let config = LlmConfig {
            backend: "gemini".to_string(),
            model: "gemini-pro".to_string(),
            api_key: None,
            api_url: None,
            temperature: None,
            request_timeout_secs: 5,
        };
        assert!(matches!(GeminiProvider::new(&config), Err(LlmError::ConfigError(_))));
    }
}
