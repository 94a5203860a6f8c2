//! Model backend abstraction.
//!
//! Provides a unified interface over OpenAI-compatible chat and embedding APIs.

use crate::chat::{ChatMessage, ChatReply, ToolSpec};
use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Configuration for an OpenAI-compatible model backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the API.
    pub api_base: String,
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Chat model identifier.
    pub model: String,
    /// Sampling temperature for chat completions.
    pub temperature: f32,
    /// Embedding model identifier.
    pub embedding_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            embedding_model: "text-embedding-3-small".to_string(),
        }
    }
}

/// Trait for chat model backends.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Sends the message sequence to the model, offering `tools`.
    ///
    /// An empty `tools` slice withholds tool access entirely; the model can
    /// only answer with text.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call fails.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ChatReply, LlmError>;

    /// Returns the chat model name.
    fn model(&self) -> &str;
}

/// Trait for text embedding backends.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embeds each text into a vector, one per input, in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedding call fails.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.api_base, "https://api.openai.com/v1");
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn config_deserializes_with_partial_fields() {
        let config: LlmConfig =
            serde_json::from_str(r#"{"api_key":"sk-test","model":"gpt-4o"}"#).expect("deserialize");
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.embedding_model, "text-embedding-3-small");
    }
}
