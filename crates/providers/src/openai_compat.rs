//! OpenAI-compatible backend over HTTP.
//!
//! One implementation serves Ollama, OpenAI, OpenRouter, and vLLM: all
//! of them speak `/v1/chat/completions` and `/v1/embeddings`. Covers
//! plain completions, JSON-mode classification completions, SSE
//! streaming, and embeddings.

use async_trait::async_trait;
use futures::StreamExt;
use oxpecker_core::error::ProviderError;
use oxpecker_core::message::Role;
use oxpecker_core::provider::{
    EmbeddingRequest, EmbeddingResponse, GenerationRequest, GenerationResponse, Provider,
    StreamChunk, Usage,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// A provider backed by an OpenAI-compatible `/v1` endpoint.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self::with_timeout(name, base_url, api_key, Duration::from_secs(120))
    }

    /// Build a provider whose HTTP client enforces `timeout` per call.
    pub fn with_timeout(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Local Ollama endpoint; the key is a placeholder Ollama ignores.
    pub fn ollama(base_url: Option<&str>) -> Self {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama",
        )
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    fn completion_body(request: &GenerationRequest, stream: bool) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": wire_role(m.role),
                    "content": m.content,
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": messages,
            "temperature": request.temperature,
            "stream": stream,
        });
        if stream {
            // Ask for a usage chunk at end of stream.
            body["stream_options"] = serde_json::json!({ "include_usage": true });
        }
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = max_tokens.into();
        }
        if request.json {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }
        body
    }

    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
        sse: bool,
    ) -> Result<reqwest::Response, ProviderError> {
        let mut builder = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body);
        if sse {
            builder = builder.header("Accept", "text/event-stream");
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(e.to_string())
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        match status {
            200 => Ok(response),
            429 => Err(ProviderError::RateLimited { retry_after_secs: 5 }),
            401 | 403 => Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            )),
            _ => {
                let detail = response.text().await.unwrap_or_default();
                warn!(status, body = %detail, "Backend rejected request");
                Err(ProviderError::ApiError {
                    status_code: status,
                    message: detail,
                })
            }
        }
    }
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn bad_payload(context: &str, e: impl std::fmt::Display) -> ProviderError {
    ProviderError::ApiError {
        status_code: 200,
        message: format!("{context}: {e}"),
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, ProviderError> {
        debug!(provider = %self.name, model = %request.model, json = request.json, "Completion request");

        let body = Self::completion_body(&request, false);
        let response = self.post("/chat/completions", &body, false).await?;
        let reply: ChatCompletion = response
            .json()
            .await
            .map_err(|e| bad_payload("Unparseable completion response", e))?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| bad_payload("Completion response", "no choices"))?;

        Ok(GenerationResponse {
            content,
            usage: reply.usage.map(Into::into),
            model: reply.model,
        })
    }

    async fn stream(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<StreamChunk, ProviderError>>,
        ProviderError,
    > {
        debug!(provider = %self.name, model = %request.model, "Streaming request");

        let body = Self::completion_body(&request, true);
        let response = self.post("/chat/completions", &body, true).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(64);
        let provider = self.name.clone();

        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut lines = SseLineBuffer::default();

            while let Some(piece) = bytes.next().await {
                let piece = match piece {
                    Ok(piece) => piece,
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                for payload in lines.push(&piece) {
                    if payload == "[DONE]" {
                        let _ = tx.send(Ok(final_chunk(None))).await;
                        return;
                    }

                    let event: SseCompletionChunk = match serde_json::from_str(&payload) {
                        Ok(event) => event,
                        Err(e) => {
                            trace!(provider = %provider, payload = %payload, error = %e, "Skipping unparseable SSE payload");
                            continue;
                        }
                    };

                    let delta = event
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|c| c.delta.content)
                        .filter(|content| !content.is_empty());
                    if let Some(content) = delta {
                        let chunk = StreamChunk {
                            content: Some(content),
                            done: false,
                            usage: None,
                        };
                        if tx.send(Ok(chunk)).await.is_err() {
                            // Receiver dropped, stop reading.
                            return;
                        }
                    }

                    if let Some(usage) = event.usage {
                        let _ = tx
                            .send(Ok(final_chunk(Some(usage.into()))))
                            .await;
                        return;
                    }
                }
            }

            // Connection closed without [DONE]; treat as completed.
            let _ = tx.send(Ok(final_chunk(None))).await;
        });

        Ok(rx)
    }

    async fn embed(
        &self,
        request: EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, ProviderError> {
        debug!(
            provider = %self.name,
            model = %request.model,
            inputs = request.inputs.len(),
            "Embedding request"
        );

        let body = serde_json::json!({
            "model": request.model,
            "input": request.inputs,
            "encoding_format": "float",
        });
        let response = self.post("/embeddings", &body, false).await?;
        let reply: EmbeddingsReply = response
            .json()
            .await
            .map_err(|e| bad_payload("Unparseable embedding response", e))?;

        Ok(EmbeddingResponse {
            embeddings: reply.data.into_iter().map(|d| d.embedding).collect(),
            model: reply.model,
        })
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(response.status().is_success())
    }
}

fn final_chunk(usage: Option<Usage>) -> StreamChunk {
    StreamChunk {
        content: None,
        done: true,
        usage,
    }
}

/// Accumulates raw SSE bytes and yields complete `data:` payloads.
#[derive(Default)]
struct SseLineBuffer {
    pending: String,
}

impl SseLineBuffer {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.push_str(&String::from_utf8_lossy(bytes));

        let mut payloads = Vec::new();
        while let Some(end) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=end).collect();
            let line = line.trim_end();
            // Non-data lines (comments, event names, blanks) are noise
            // for this endpoint.
            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.trim().to_string());
            }
        }
        payloads
    }
}

// Wire shapes, kept private to this module.

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    model: String,
    choices: Vec<CompletionChoice>,
    usage: Option<TokenCounts>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenCounts {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl From<TokenCounts> for Usage {
    fn from(counts: TokenCounts) -> Self {
        Usage {
            prompt_tokens: counts.prompt_tokens,
            completion_tokens: counts.completion_tokens,
            total_tokens: counts.total_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SseCompletionChunk {
    #[serde(default)]
    choices: Vec<SseChoice>,
    #[serde(default)]
    usage: Option<TokenCounts>,
}

#[derive(Debug, Deserialize)]
struct SseChoice {
    delta: SseDelta,
}

#[derive(Debug, Deserialize)]
struct SseDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsReply {
    data: Vec<EmbeddingRow>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}
