//! Provider trait — the abstraction over the generation backend.
//!
//! A Provider knows how to send a message list to an LLM and get text
//! back, either complete or as a stream of increments. It also exposes
//! embeddings (for retrieval) and token counting (for history
//! trimming), since both capabilities are tied to the same backend.
//!
//! Implementations: OpenAI-compatible endpoints (Ollama, OpenAI,
//! OpenRouter, vLLM), custom backends, mocks for tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::Message;
use crate::token::estimate_messages_tokens;

/// A generation call: ordered messages plus sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The model to use (e.g., "llama3.1", "gpt-4o")
    pub model: String,

    /// The ordered conversation messages
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic — used by the classifiers)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Ask the backend to emit a single JSON object.
    ///
    /// Set by the router and grader, which parse one categorical field
    /// out of the response.
    #[serde(default)]
    pub json: bool,
}

fn default_temperature() -> f32 {
    0.7
}

impl GenerationRequest {
    /// A chat request with default sampling.
    pub fn chat(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: default_temperature(),
            max_tokens: None,
            json: false,
        }
    }

    /// A deterministic JSON-mode classification request.
    pub fn classification(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: 0.0,
            max_tokens: None,
            json: true,
        }
    }
}

/// A complete (non-streaming) response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// The generated text.
    pub content: String,

    /// Token usage statistics.
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested).
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A single chunk in a streaming response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Partial content delta
    #[serde(default)]
    pub content: Option<String>,

    /// Whether this is the final chunk
    #[serde(default)]
    pub done: bool,

    /// Usage info (typically only in the final chunk)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// An embedding request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// The model to use for embeddings (e.g., "nomic-embed-text").
    pub model: String,

    /// The texts to embed.
    pub inputs: Vec<String>,
}

/// An embedding response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// The embedding vectors, one per input text.
    pub embeddings: Vec<Vec<f32>>,

    /// Which model was used.
    pub model: String,
}

/// The core Provider trait.
///
/// The orchestrator calls `complete()`, `stream()`, `embed()`, and
/// `count_tokens()` without knowing which backend is configured.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "ollama").
    fn name(&self) -> &str;

    /// Send a request and get the complete response text.
    async fn complete(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, ProviderError>;

    /// Send a request and get a stream of response chunks.
    ///
    /// Default implementation calls `complete()` and wraps the result
    /// as a single chunk.
    async fn stream(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<StreamChunk, ProviderError>>,
        ProviderError,
    > {
        let response = self.complete(request).await?;
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        let _ = tx
            .send(Ok(StreamChunk {
                content: Some(response.content),
                done: true,
                usage: response.usage,
            }))
            .await;
        Ok(rx)
    }

    /// Generate embeddings for the given texts.
    ///
    /// Default implementation returns an error indicating embeddings
    /// aren't supported.
    async fn embed(
        &self,
        _request: EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, ProviderError> {
        Err(ProviderError::NotConfigured(format!(
            "Provider '{}' does not support embeddings",
            self.name()
        )))
    }

    /// Count tokens for a message list, as the backend would bill them.
    ///
    /// Default implementation uses the chars/4 heuristic; backends with
    /// a real tokenizer endpoint can override.
    fn count_tokens(&self, messages: &[Message]) -> usize {
        estimate_messages_tokens(messages)
    }

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_defaults() {
        let req = GenerationRequest::chat("llama3.1", vec![Message::user("hi")]);
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert!(!req.json);
    }

    #[test]
    fn classification_request_is_deterministic_json() {
        let req = GenerationRequest::classification("llama3.1", vec![]);
        assert_eq!(req.temperature, 0.0);
        assert!(req.json);
    }

    #[tokio::test]
    async fn default_stream_wraps_complete() {
        struct OneShot;

        #[async_trait]
        impl Provider for OneShot {
            fn name(&self) -> &str {
                "one_shot"
            }

            async fn complete(
                &self,
                _request: GenerationRequest,
            ) -> std::result::Result<GenerationResponse, ProviderError> {
                Ok(GenerationResponse {
                    content: "hello".into(),
                    usage: None,
                    model: "test".into(),
                })
            }
        }

        let mut rx = OneShot
            .stream(GenerationRequest::chat("test", vec![]))
            .await
            .unwrap();
        let chunk = rx.recv().await.unwrap().unwrap();
        assert_eq!(chunk.content.as_deref(), Some("hello"));
        assert!(chunk.done);
    }

    #[test]
    fn default_token_count_uses_heuristic() {
        struct OneShot;

        #[async_trait]
        impl Provider for OneShot {
            fn name(&self) -> &str {
                "one_shot"
            }

            async fn complete(
                &self,
                _request: GenerationRequest,
            ) -> std::result::Result<GenerationResponse, ProviderError> {
                unreachable!()
            }
        }

        // 4 chars → 1 token + 4 overhead = 5
        assert_eq!(OneShot.count_tokens(&[Message::user("test")]), 5);
    }
}
