use crate::traits::{LlmClient, LlmError, LlmResponse};
use async_trait::async_trait;
use pressroom_common::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for the editor-side LLM proxy.
///
/// The proxy injects provider credentials server-side, so this client never
/// holds an API key. Contract: `POST <endpoint>` with
/// `{system, prompt, temperature, maxTokens, provider, model}` answers `{text}`.
pub struct ProxyClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProxyRequest<'a> {
    system: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
    provider: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct ProxyReply {
    text: Option<String>,
}

impl ProxyClient {
    pub fn new(endpoint: String, model: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            model: model.unwrap_or_else(|| "auto".to_string()),
        })
    }
}

#[async_trait]
impl LlmClient for ProxyClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let body = ProxyRequest {
            system: system_prompt.unwrap_or(""),
            prompt,
            temperature: temperature.unwrap_or(crate::traits::SUGGESTION_TEMPERATURE),
            max_tokens: max_tokens.unwrap_or(crate::traits::SUGGESTION_MAX_TOKENS),
            provider: "auto",
            model: &self.model,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(LlmError::from)?;

        let status = resp.status();
        if !status.is_success() {
            let msg = resp
                .text()
                .await
                .unwrap_or_else(|_| status.as_u16().to_string());
            return Err(LlmError::Api(format!("LLM proxy error: {msg}")).into());
        }

        let reply: ProxyReply = resp
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let text = reply
            .text
            .ok_or_else(|| LlmError::InvalidResponse("missing `text` field".to_string()))?;

        Ok(LlmResponse {
            text,
            model: Some(self.model.clone()),
            tokens_used: None,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        match self.generate("Respond with just 'OK'", None, Some(5), Some(0.1)).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Proxy health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
