//! Vector store trait and retrieval value objects.
//!
//! The store itself (embedding model, index layout, persistence) is a
//! collaborator behind this trait. The orchestration core only needs
//! idempotent upsert and ranked top-k query.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::RetrievalError;

/// A stored document chunk with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Content-derived identifier: `hex(sha256(text)) + "_" + chunk index`.
    /// The same chunk text always maps to the same store key, so
    /// re-ingestion deduplicates by construction.
    pub id: String,

    /// The chunk text.
    pub text: String,

    /// Where the chunk came from.
    pub source_url: String,

    /// Embedding vector for similarity search.
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

/// A passage returned by a retrieval query.
///
/// Ephemeral — scoped to a single request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// The passage text.
    pub text: String,

    /// Source URL carried from the document metadata.
    pub source_url: String,
}

/// The vector store contract.
///
/// Implementations: in-memory (shipped), or any external index that
/// can honor idempotent upsert and ranked query.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// The store name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Insert a document unless its id already exists.
    ///
    /// Returns `true` if the document was added, `false` if the id was
    /// already present (no-op).
    async fn upsert(&self, document: Document) -> std::result::Result<bool, RetrievalError>;

    /// Return up to `top_k` passages ranked by descending similarity
    /// to the query embedding. An empty result is valid, not an error.
    async fn query(
        &self,
        embedding: &[f32],
        top_k: usize,
    ) -> std::result::Result<Vec<RetrievedPassage>, RetrievalError>;

    /// Number of stored documents.
    async fn len(&self) -> std::result::Result<usize, RetrievalError>;

    /// Remove all stored documents.
    async fn clear(&self) -> std::result::Result<(), RetrievalError>;
}
