pub mod fence;
pub mod models;
pub mod providers;

use crate::config::LlmConfig;
use crate::prompt::{build_prompt, Prompt, PROMPT_TEMPLATE};
use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use tracing::{debug, info};

pub use fence::strip_code_fence;
pub use models::Completion;

#[derive(Debug)]
pub enum LlmError {
    ConnectionError(String),
    ResponseError(String),
    ConfigError(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::ConnectionError(msg) => write!(f, "LLM connection error: {}", msg),
            LlmError::ResponseError(msg) => write!(f, "LLM response error: {}", msg),
            LlmError::ConfigError(msg) => write!(f, "LLM configuration error: {}", msg),
        }
    }
}

impl Error for LlmError {}

/// A backend that turns a prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<Completion, LlmError>;
}

/// Translates natural-language questions into bare SQL strings.
pub struct Translator {
    generator: Box<dyn TextGenerator>,
    template: String,
}

impl Translator {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let generator: Box<dyn TextGenerator> = match config.backend.as_str() {
            "gemini" => Box::new(providers::gemini::GeminiProvider::new(config)?),
            "remote" => Box::new(providers::remote::RemoteLlmProvider::new(config)?),
            "ollama" => Box::new(providers::ollama::OllamaProvider::new(config)?),
            _ => {
                return Err(LlmError::ConfigError(format!(
                    "Unsupported LLM backend: {}",
                    config.backend
                )))
            }
        };

        info!("LLM backend '{}' ready with model '{}'", config.backend, config.model);
        Ok(Self::with_generator(generator))
    }

    /// Uses an already constructed backend with the built-in template.
    pub fn with_generator(generator: Box<dyn TextGenerator>) -> Self {
        Self {
            generator,
            template: PROMPT_TEMPLATE.to_string(),
        }
    }

    /// One generation call, no retries. The returned string has surrounding
    /// whitespace and markdown code fences removed but is otherwise
    /// unvalidated SQL.
    pub async fn translate(&self, question: &str) -> Result<String, LlmError> {
        let prompt = build_prompt(&self.template, question);

        let completion = self.generator.generate(&prompt).await?;
        debug!("Raw completion: {:?}", completion);

        let text = completion.into_text()?;
        Ok(strip_code_fence(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Recording {
        reply: &'static str,
        seen: Arc<Mutex<Vec<Prompt>>>,
    }

    #[async_trait]
    impl TextGenerator for Recording {
        async fn generate(&self, prompt: &Prompt) -> Result<Completion, LlmError> {
            self.seen.lock().unwrap().push(prompt.clone());
            Ok(Completion::from_text(self.reply))
        }
    }

    struct Silent;

    #[async_trait]
    impl TextGenerator for Silent {
        async fn generate(&self, _prompt: &Prompt) -> Result<Completion, LlmError> {
            Ok(Completion::empty(Some("SAFETY".to_string())))
        }
    }

    #[tokio::test]
    async fn translate_sends_template_and_question_and_strips_fences() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let translator = Translator::with_generator(Box::new(Recording {
            reply: "```sql\nSELECT * FROM Apartments;\n```",
            seen: Arc::clone(&seen),
        }));
        let sql = translator
            .translate("Show me all the details of apartments.")
            .await
            .unwrap();

        assert_eq!(sql, "SELECT * FROM Apartments;");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].parts(),
            [PROMPT_TEMPLATE, "Show me all the details of apartments."]
        );
    }

    #[tokio::test]
    async fn missing_text_is_a_response_error() {
        let translator = Translator::with_generator(Box::new(Silent));

        match translator.translate("anything").await {
            Err(LlmError::ResponseError(msg)) => assert!(msg.contains("SAFETY"), "{}", msg),
            other => panic!("expected response error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let mut config = crate::config::AppConfig::default().llm;
        config.backend = "carrier-pigeon".to_string();

        assert!(matches!(Translator::new(&config), Err(LlmError::ConfigError(_))));
    }
}
