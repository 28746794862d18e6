//! Provider-agnostic text-generation collaborator for Pressroom.
//!
//! This crate exposes a common [`traits::LlmClient`] interface and concrete
//! clients for the editor proxy, Ollama and OpenAI. The analytical core only
//! ever sees `&dyn LlmClient`; [`ensure_llm_ready`] turns a
//! [`pressroom_common::LlmConfig`] into a ready client.
//!
//! # Examples
//! ```no_run
//! use pressroom_common::{LlmConfig, Result};
//! use pressroom_llm::ensure_llm_ready;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let cfg = LlmConfig::Proxy { endpoint: "http://localhost:3000/api/llm".into(), model: None };
//! let client = ensure_llm_ready(&cfg).await?;
//! assert!(!client.model_name().is_empty());
//! # Ok(())
//! # }
//! ```
pub mod ollama;
pub mod openai;
pub mod proxy;
pub mod traits;

use pressroom_common::{LlmConfig, PressroomError};
use proxy::ProxyClient;
use std::sync::Arc;
use traits::LlmClient;

/// Construct the configured collaborator client.
pub async fn ensure_llm_ready(
    config: &LlmConfig,
) -> pressroom_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config {
        LlmConfig::Proxy { endpoint, model } => {
            let client = ProxyClient::new(endpoint.clone(), model.clone())?;
            Ok(Arc::new(client))
        }
        #[cfg(feature = "ollama")]
        LlmConfig::Ollama { base_url, model } => {
            let client = ollama::OllamaClient::new(base_url.clone(), model.clone()).await?;
            Ok(Arc::new(client))
        }
        #[cfg(feature = "openai")]
        LlmConfig::OpenAi {
            api_key,
            model,
            base_url,
        } => {
            let client =
                openai::OpenAiClient::new(api_key.clone(), model.clone(), base_url.clone())?;
            Ok(Arc::new(client))
        }
        LlmConfig::None => Err(PressroomError::Config("No LLM configured".to_string())),
        #[allow(unreachable_patterns)]
        _ => Err(PressroomError::Config("LLM provider not enabled".to_string())),
    }
}
