//! Scripted collaborators for pipeline tests.

use async_trait::async_trait;
use oxpecker_core::error::{ProviderError, RetrievalError};
use oxpecker_core::provider::{
    EmbeddingRequest, EmbeddingResponse, GenerationRequest, GenerationResponse, Provider,
    StreamChunk,
};
use oxpecker_core::retrieval::{Document, RetrievedPassage, VectorStore};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// A provider that replays scripted responses in order.
///
/// `complete()` pops the next scripted completion and panics when the
/// script runs dry, so a test fails loudly if the pipeline makes more
/// model calls than expected. `stream()` replays the configured chunk
/// list (or falls back to wrapping `complete()` when none is set).
pub struct MockBackend {
    completions: Mutex<VecDeque<String>>,
    stream_chunks: Option<Vec<String>>,
    embedding: Vec<f32>,
    requests: Mutex<Vec<GenerationRequest>>,
    complete_calls: AtomicUsize,
    stream_calls: AtomicUsize,
    embed_calls: AtomicUsize,
}

impl MockBackend {
    pub fn completions(script: Vec<String>) -> Self {
        Self {
            completions: Mutex::new(script.into()),
            stream_chunks: None,
            embedding: vec![1.0, 0.0],
            requests: Mutex::new(Vec::new()),
            complete_calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
            embed_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_stream_chunks(mut self, chunks: Vec<&str>) -> Self {
        self.stream_chunks = Some(chunks.into_iter().map(String::from).collect());
        self
    }

    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    pub fn recorded_requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockBackend {
    fn name(&self) -> &str {
        "mock_backend"
    }

    async fn complete(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        let content = self
            .completions
            .lock()
            .unwrap()
            .pop_front()
            .expect("mock backend script exhausted");
        Ok(GenerationResponse {
            content,
            usage: None,
            model: "mock".into(),
        })
    }

    async fn stream(
        &self,
        request: GenerationRequest,
    ) -> Result<mpsc::Receiver<Result<StreamChunk, ProviderError>>, ProviderError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        let Some(chunks) = self.stream_chunks.clone() else {
            self.requests.lock().unwrap().push(request);
            let content = self
                .completions
                .lock()
                .unwrap()
                .pop_front()
                .expect("mock backend script exhausted");
            let (tx, rx) = mpsc::channel(1);
            let _ = tx
                .send(Ok(StreamChunk {
                    content: Some(content),
                    done: true,
                    usage: None,
                }))
                .await;
            return Ok(rx);
        };

        self.requests.lock().unwrap().push(request);
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            for chunk in chunks {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                if tx
                    .send(Ok(StreamChunk {
                        content: Some(chunk),
                        done: false,
                        usage: None,
                    }))
                    .await
                    .is_err()
                {
                    return;
                }
            }
            let _ = tx
                .send(Ok(StreamChunk {
                    content: None,
                    done: true,
                    usage: None,
                }))
                .await;
        });
        Ok(rx)
    }

    async fn embed(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, ProviderError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(EmbeddingResponse {
            embeddings: vec![self.embedding.clone(); request.inputs.len()],
            model: request.model,
        })
    }
}

/// A vector store that replays scripted query results in order.
pub struct QueueStore {
    results: Mutex<VecDeque<Vec<RetrievedPassage>>>,
    query_calls: AtomicUsize,
}

impl QueueStore {
    pub fn new(results: Vec<Vec<RetrievedPassage>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            query_calls: AtomicUsize::new(0),
        }
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorStore for QueueStore {
    fn name(&self) -> &str {
        "queue"
    }

    async fn upsert(&self, _document: Document) -> Result<bool, RetrievalError> {
        Ok(true)
    }

    async fn query(
        &self,
        _embedding: &[f32],
        _top_k: usize,
    ) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn len(&self) -> Result<usize, RetrievalError> {
        Ok(0)
    }

    async fn clear(&self) -> Result<(), RetrievalError> {
        Ok(())
    }
}

pub fn passage(text: &str) -> RetrievedPassage {
    RetrievedPassage {
        text: text.into(),
        source_url: "https://example.edu/course/".into(),
    }
}
