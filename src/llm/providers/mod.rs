pub mod gemini;
pub mod ollama;
pub mod remote;

use crate::config::LlmConfig;
use crate::llm::LlmError;
use std::time::Duration;

/// HTTP client shared by the backends, honouring the configured timeout.
fn http_client(config: &LlmConfig) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| LlmError::ConnectionError(e.to_string()))
}

/// Turns a non-success response into a `ResponseError` carrying the body.
async fn status_error(backend: &str, response: reqwest::Response) -> LlmError {
    let status = response.status();
    // Try to get the error message from the response body
    let error_body = match response.text().await {
        Ok(body) if !body.is_empty() => format!(" - Response body: {}", body),
        _ => String::new(),
    };

    LlmError::ResponseError(format!(
        "{} API responded with status code: {}{}",
        backend, status, error_body
    ))
}
