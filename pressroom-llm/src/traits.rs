use async_trait::async_trait;
use pressroom_common::{PressroomError, Result};
use serde::{Deserialize, Serialize};

/// Sampling defaults used when paraphrasing a single suggestion sentence.
pub const SUGGESTION_TEMPERATURE: f32 = 0.3;
pub const SUGGESTION_MAX_TOKENS: u32 = 180;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response shape: {0}")]
    InvalidResponse(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<LlmError> for PressroomError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Config(msg) => PressroomError::Config(msg),
            other => PressroomError::Llm(other.to_string()),
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt with optional system prompt
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Check if the LLM service is available
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// System prompt used when the template library does not carry one.
    fn default_editorial_system_prompt(&self) -> &str {
        r#"You are an experienced campaign communications editor who drafts and fact-checks press releases.

Your role:
- Rewrite a draft sentence so it reads naturally inside a press release
- Keep every name, date, URL and figure exactly as given
- Never invent facts, quotes or endorsements

Guidelines:
- Answer with the rewritten sentence only
- One or two sentences, plain text, no markdown"#
    }

    /// `(system, user) -> text` with suggestion sampling defaults.
    ///
    /// An empty system prompt falls back to
    /// [`LlmClient::default_editorial_system_prompt`]. The reply is trimmed.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let system = if system_prompt.trim().is_empty() {
            self.default_editorial_system_prompt()
        } else {
            system_prompt
        };

        tracing::debug!(model = self.model_name(), "completion prompt: {}", user_prompt);
        let response = self
            .generate(
                user_prompt,
                Some(system),
                Some(SUGGESTION_MAX_TOKENS),
                Some(SUGGESTION_TEMPERATURE),
            )
            .await?;
        tracing::debug!("LLM response: {}", response.text);

        Ok(response.text.trim().to_string())
    }
}
