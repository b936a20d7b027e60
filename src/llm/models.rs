use super::LlmError;

/// What a backend produced for one prompt, normalized across providers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    /// Text segments in the order the backend returned them.
    pub parts: Vec<String>,
    /// Backend-specific reason the generation stopped, when reported.
    pub finish_reason: Option<String>,
}

impl Completion {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![text.into()],
            finish_reason: None,
        }
    }

    /// A completion that carries no text, e.g. a blocked candidate.
    pub fn empty(finish_reason: Option<String>) -> Self {
        Self {
            parts: Vec::new(),
            finish_reason,
        }
    }

    /// Concatenated text, or a response error when the backend returned
    /// nothing usable.
    pub fn into_text(self) -> Result<String, LlmError> {
        let text = self.parts.concat();
        if text.trim().is_empty() {
            return Err(LlmError::ResponseError(match self.finish_reason {
                Some(reason) => format!("No text in completion (finish reason: {})", reason),
                None => "No text in completion".to_string(),
            }));
        }
        Ok(text)
    }
}
