use crate::config::LlmConfig;
use crate::llm::providers::{http_client, status_error};
use crate::llm::{Completion, LlmError, TextGenerator};
use crate::prompt::Prompt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Any OpenAI-compatible chat completions endpoint.
pub struct RemoteLlmProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct PromptRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct PromptResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl RemoteLlmProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_url = config.api_url.clone().ok_or_else(|| {
            LlmError::ConfigError("API URL is required for remote LLM provider".to_string())
        })?;

        let api_key = config.api_key.clone().ok_or_else(|| {
            LlmError::ConfigError("API key is required for remote LLM provider".to_string())
        })?;

        Ok(Self {
            client: http_client(config)?,
            api_url,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature.unwrap_or(0.1),
        })
    }
}

#[async_trait]
impl TextGenerator for RemoteLlmProvider {
    async fn generate(&self, prompt: &Prompt) -> Result<Completion, LlmError> {
        let request = PromptRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &prompt.instruction,
                },
                Message {
                    role: "user",
                    content: &prompt.question,
                },
            ],
            temperature: self.temperature,
            max_tokens: 2000,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error("Remote", response).await);
        }

        let prompt_response: PromptResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseError(e.to_string()))?;

        let Some(choice) = prompt_response.choices.into_iter().next() else {
            return Err(LlmError::ResponseError("No choices in response".to_string()));
        };

        Ok(Completion {
            parts: choice.message.content.into_iter().collect(),
            finish_reason: choice.finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::build_prompt;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> LlmConfig {
        LlmConfig {
            backend: "remote".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: Some("sk-test".to_string()),
            api_url: Some(format!("{}/v1/chat/completions", server.uri())),
            temperature: None,
            request_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_chat_completion_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "messages": [
                    { "role": "system", "content": "schema" },
                    { "role": "user", "content": "count guests" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "SELECT COUNT(*) FROM Guests;" },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&mock_server)
            .await;

        let provider = RemoteLlmProvider::new(&config_for(&mock_server)).unwrap();
        let completion = provider
            .generate(&build_prompt("schema", "count guests"))
            .await
            .unwrap();

        assert_eq!(completion.into_text().unwrap(), "SELECT COUNT(*) FROM Guests;");
    }

    #[tokio::test]
    async fn test_no_choices() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&mock_server)
            .await;

        let provider = RemoteLlmProvider::new(&config_for(&mock_server)).unwrap();
        let result = provider.generate(&build_prompt("schema", "q")).await;

        assert!(matches!(result, Err(LlmError::ResponseError(_))));
    }
}
