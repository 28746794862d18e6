//! Common types and utilities shared across Pressroom crates.
//!
//! This crate defines the provider-agnostic LLM configuration, observability
//! helpers, and the shared error type used throughout the Pressroom
//! workspace. It stays dependency-light so the analytical core and the
//! binaries can both depend on it.
//!
//! # Overview
//!
//! - [`LlmConfig`]: which text-generation collaborator to talk to
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`PressroomError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use pressroom_common::LlmConfig;
//!
//! let cfg: LlmConfig = serde_json::from_str(r#"{"provider":"none"}"#).unwrap();
//! assert!(matches!(cfg, LlmConfig::None));
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Configuration for the text-generation collaborator.
///
/// Feature flags control which provider variants are compiled in.
/// See the `pressroom-llm` crate for concrete client implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmConfig {
    /// Editor-side proxy that injects provider credentials server-side.
    Proxy {
        endpoint: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
    },
    #[cfg(feature = "ollama")]
    Ollama {
        #[serde(default = "default_ollama_endpoint")]
        base_url: String,
        model: String,
    },
    #[cfg(feature = "openai")]
    #[serde(rename = "openai")]
    OpenAi {
        api_key: String,
        model: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    None,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::None
    }
}

#[cfg(feature = "ollama")]
fn default_ollama_endpoint() -> String {
    "http://localhost:11434".into()
}

/// Error types used across the Pressroom system.
#[derive(thiserror::Error, Debug)]
pub enum PressroomError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The text-generation collaborator failed or replied with garbage.
    #[error("LLM error: {0}")]
    Llm(String),
}

/// Convenient alias for results that use [`PressroomError`].
pub type Result<T> = std::result::Result<T, PressroomError>;
