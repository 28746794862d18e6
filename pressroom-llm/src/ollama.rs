use crate::traits::{LlmClient, LlmError, LlmResponse};
use async_trait::async_trait;
use pressroom_common::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OLLAMA_CONNECTION_ERROR: &str = "No running Ollama server detected. Start it with `ollama serve`.";

/// Local Ollama server. The configured model must already be pulled.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Deserialize)]
struct GenerateReply {
    response: Option<String>,
    eval_count: Option<u32>,
}

#[derive(Deserialize)]
struct TagsReply {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

impl OllamaClient {
    /// Build the client, then check the server is up and has the model.
    pub async fn new(base_url: String, model: String) -> Result<Self> {
        let client = Self::unchecked(base_url, model)?;
        let installed = client.installed_models().await?;
        if !installed.iter().any(|name| client.matches_model(name)) {
            return Err(LlmError::ModelNotAvailable(format!(
                "{} (run `ollama pull {}`)",
                client.model, client.model
            ))
            .into());
        }
        Ok(client)
    }

    /// Build the client without touching the network.
    pub fn unchecked(base_url: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    /// Installed tags come back as `name:tag`; a bare name matches any tag.
    fn matches_model(&self, installed: &str) -> bool {
        installed == self.model || installed.split(':').next() == Some(self.model.as_str())
    }

    async fn installed_models(&self) -> Result<Vec<String>> {
        let resp = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|_| LlmError::Api(OLLAMA_CONNECTION_ERROR.to_string()))?;
        if !resp.status().is_success() {
            return Err(LlmError::Api(OLLAMA_CONNECTION_ERROR.to_string()).into());
        }

        let tags: TagsReply = resp
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("models listing: {e}")))?;
        Ok(tags.models.into_iter().map(|t| t.name).collect())
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            system: system_prompt,
            stream: false,
            options: GenerateOptions {
                temperature,
                num_predict: max_tokens,
            },
        };

        let resp = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(LlmError::from)?;
        if !resp.status().is_success() {
            return Err(LlmError::Api(format!("Generate failed: HTTP {}", resp.status())).into());
        }

        let reply: GenerateReply = resp
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        let text = reply
            .response
            .ok_or_else(|| LlmError::InvalidResponse("missing `response` field".to_string()))?;

        Ok(LlmResponse {
            text,
            model: Some(self.model.clone()),
            tokens_used: reply.eval_count,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.installed_models().await.is_ok())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
