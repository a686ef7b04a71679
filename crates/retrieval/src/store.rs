//! In-memory vector store backend.
//!
//! Pure-Rust cosine similarity over an `Arc<RwLock<Vec<_>>>` of
//! documents. Useful for tests and single-process deployments; the
//! `VectorStore` trait keeps the door open for an external index.

use async_trait::async_trait;
use oxpecker_core::error::RetrievalError;
use oxpecker_core::retrieval::{Document, RetrievedPassage, VectorStore};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal.
/// Returns 0.0 if either vector is zero-length or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// An in-memory vector store.
pub struct InMemoryVectorStore {
    documents: Arc<RwLock<Vec<Document>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn upsert(&self, document: Document) -> Result<bool, RetrievalError> {
        let mut documents = self.documents.write().await;
        if documents.iter().any(|d| d.id == document.id) {
            debug!(id = %document.id, "Skipped existing document");
            return Ok(false);
        }
        documents.push(document);
        Ok(true)
    }

    async fn query(
        &self,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        let documents = self.documents.read().await;

        let mut scored: Vec<(f32, &Document)> = documents
            .iter()
            .map(|d| (cosine_similarity(&d.embedding, embedding), d))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(_, d)| RetrievedPassage {
                text: d.text.clone(),
                source_url: d.source_url.clone(),
            })
            .collect())
    }

    async fn len(&self) -> Result<usize, RetrievalError> {
        Ok(self.documents.read().await.len())
    }

    async fn clear(&self) -> Result<(), RetrievalError> {
        self.documents.write().await.clear();
        Ok(())
    }
}
