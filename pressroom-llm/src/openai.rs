use crate::traits::{LlmClient, LlmError, LlmResponse};
use async_trait::async_trait;
use pressroom_common::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI (or compatible gateway) chat-completions client.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub model: String,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatUsage {
    pub total_tokens: u32,
}

impl OpenAiClient {
    /// Create a new client for the given API key and model.
    ///
    /// `base_url` points at an OpenAI-compatible gateway; `None` uses the
    /// public API.
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base_url = base_url
            .unwrap_or_else(|| OPENAI_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let req = ChatRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens,
        };

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(LlmError::from)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {status}: {body}")).into());
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let text = parsed
            .choices
            .iter()
            .find_map(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(LlmResponse {
            text,
            model: Some(parsed.model),
            tokens_used: parsed.usage.map(|u| u.total_tokens),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        match self.generate("Respond with just 'OK'", None, Some(5), Some(0.1)).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("OpenAi health check failed: {}", e);
                Ok(false)
            }
        }
    }
}
