//! Document ingestion: chunk splitting and idempotent upsert.
//!
//! Chunk ids are derived from the chunk text itself
//! (`hex(sha256(text)) + "_" + index`), so re-ingesting the same
//! content is a no-op by construction — no coordination with previous
//! runs needed.

use oxpecker_core::error::{Error, RetrievalError};
use oxpecker_core::provider::{EmbeddingRequest, Provider};
use oxpecker_core::retrieval::{Document, VectorStore};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info};

/// Split `text` into fixed-size chunks with overlap.
///
/// Boundaries are aligned to char boundaries, never mid-codepoint.
/// `overlap` must be smaller than `chunk_size` (validated by config).
pub fn split_chunks(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}

/// Content-derived chunk identifier.
pub fn chunk_id(chunk_text: &str, index: usize) -> String {
    let digest = Sha256::digest(chunk_text.as_bytes());
    format!("{digest:x}_{index}")
}

/// Splits source text into chunks, embeds each, and upserts into the
/// vector store.
pub struct DocumentIngestor {
    provider: Arc<dyn Provider>,
    store: Arc<dyn VectorStore>,
    embedding_model: String,
    chunk_size: usize,
    chunk_overlap: usize,
}

/// Counts from one ingestion pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub chunks: usize,
    pub added: usize,
    pub skipped: usize,
}

impl DocumentIngestor {
    pub fn new(
        provider: Arc<dyn Provider>,
        store: Arc<dyn VectorStore>,
        embedding_model: impl Into<String>,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Self {
        Self {
            provider,
            store,
            embedding_model: embedding_model.into(),
            chunk_size,
            chunk_overlap,
        }
    }

    /// Ingest one source document: split, embed, upsert.
    ///
    /// Chunks whose id already exists count as skipped and leave the
    /// stored document untouched.
    pub async fn ingest(&self, text: &str, source_url: &str) -> Result<IngestStats, Error> {
        let chunks = split_chunks(text, self.chunk_size, self.chunk_overlap);
        let mut stats = IngestStats {
            chunks: chunks.len(),
            ..IngestStats::default()
        };

        for (index, chunk) in chunks.into_iter().enumerate() {
            let id = chunk_id(&chunk, index);

            let embedding = self
                .provider
                .embed(EmbeddingRequest {
                    model: self.embedding_model.clone(),
                    inputs: vec![chunk.clone()],
                })
                .await?
                .embeddings
                .into_iter()
                .next()
                .ok_or_else(|| {
                    Error::Retrieval(RetrievalError::IngestFailed {
                        url: source_url.to_string(),
                        reason: "backend returned no embedding vectors".into(),
                    })
                })?;

            let added = self
                .store
                .upsert(Document {
                    id: id.clone(),
                    text: chunk,
                    source_url: source_url.to_string(),
                    embedding,
                })
                .await?;

            if added {
                stats.added += 1;
            } else {
                debug!(id = %id, source = %source_url, "Chunk already stored");
                stats.skipped += 1;
            }
        }

        info!(
            source = %source_url,
            chunks = stats.chunks,
            added = stats.added,
            skipped = stats.skipped,
            "Document ingested"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryVectorStore;
    use async_trait::async_trait;
    use oxpecker_core::error::ProviderError;
    use oxpecker_core::provider::{
        EmbeddingResponse, GenerationRequest, GenerationResponse,
    };

    struct UnitEmbedder;

    #[async_trait]
    impl Provider for UnitEmbedder {
        fn name(&self) -> &str {
            "unit_embedder"
        }

        async fn complete(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, ProviderError> {
            unreachable!()
        }

        async fn embed(
            &self,
            request: EmbeddingRequest,
        ) -> Result<EmbeddingResponse, ProviderError> {
            Ok(EmbeddingResponse {
                embeddings: vec![vec![1.0, 0.0]; request.inputs.len()],
                model: request.model,
            })
        }
    }

    struct NoVectors;

    #[async_trait]
    impl Provider for NoVectors {
        fn name(&self) -> &str {
            "no_vectors"
        }

        async fn complete(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, ProviderError> {
            unreachable!()
        }

        async fn embed(
            &self,
            request: EmbeddingRequest,
        ) -> Result<EmbeddingResponse, ProviderError> {
            Ok(EmbeddingResponse {
                embeddings: vec![],
                model: request.model,
            })
        }
    }

    #[test]
    fn split_short_text_is_one_chunk() {
        let chunks = split_chunks("short text", 512, 64);
        assert_eq!(chunks, vec!["short text".to_string()]);
    }

    #[test]
    fn split_respects_chunk_size_and_overlap() {
        let text = "abcdefghij"; // 10 chars
        let chunks = split_chunks(text, 4, 2);
        assert_eq!(chunks[0], "abcd");
        assert_eq!(chunks[1], "cdef"); // starts 2 back
        assert!(chunks.iter().all(|c| c.chars().count() <= 4));
        // Every char of the input appears in some chunk
        let joined: String = chunks.concat();
        for c in text.chars() {
            assert!(joined.contains(c));
        }
    }

    #[test]
    fn split_empty_text_is_empty() {
        assert!(split_chunks("", 512, 64).is_empty());
    }

    #[test]
    fn split_handles_multibyte_chars() {
        let text = "äöü".repeat(10);
        let chunks = split_chunks(&text, 7, 2);
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.chars().count() <= 7));
    }

    #[test]
    fn chunk_id_is_stable_for_same_text() {
        assert_eq!(chunk_id("same text", 3), chunk_id("same text", 3));
        assert_ne!(chunk_id("same text", 3), chunk_id("same text", 4));
        assert_ne!(chunk_id("same text", 3), chunk_id("other text", 3));
    }

    #[tokio::test]
    async fn ingest_twice_is_idempotent() {
        let store = Arc::new(InMemoryVectorStore::new());
        let ingestor = DocumentIngestor::new(
            Arc::new(UnitEmbedder),
            store.clone(),
            "nomic-embed-text",
            512,
            64,
        );

        let first = ingestor
            .ingest("Course deadlines are listed on the schedule page.", "https://example.edu/")
            .await
            .unwrap();
        assert_eq!(first.added, 1);
        assert_eq!(first.skipped, 0);

        let second = ingestor
            .ingest("Course deadlines are listed on the schedule page.", "https://example.edu/")
            .await
            .unwrap();
        assert_eq!(second.added, 0);
        assert_eq!(second.skipped, 1);

        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_embedding_fails_the_ingest() {
        let store = Arc::new(InMemoryVectorStore::new());
        let ingestor = DocumentIngestor::new(
            Arc::new(NoVectors),
            store.clone(),
            "nomic-embed-text",
            512,
            64,
        );

        let err = ingestor
            .ingest("Course deadlines are listed on the schedule page.", "https://example.edu/")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Retrieval(RetrievalError::IngestFailed { .. })
        ));

        // Nothing was stored for the failed chunk.
        assert_eq!(store.len().await.unwrap(), 0);
    }
}
