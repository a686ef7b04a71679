//! The retriever adapter: embed a query, run a top-k store query.
//!
//! Performs no caching — every call re-embeds the query text, so a
//! rewritten question gets a genuinely fresh retrieval.

use oxpecker_core::error::{Error, RetrievalError};
use oxpecker_core::provider::{EmbeddingRequest, Provider};
use oxpecker_core::retrieval::{RetrievedPassage, VectorStore};
use std::sync::Arc;
use tracing::debug;

pub struct Retriever {
    provider: Arc<dyn Provider>,
    store: Arc<dyn VectorStore>,
    embedding_model: String,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        provider: Arc<dyn Provider>,
        store: Arc<dyn VectorStore>,
        embedding_model: impl Into<String>,
        top_k: usize,
    ) -> Self {
        Self {
            provider,
            store,
            embedding_model: embedding_model.into(),
            top_k,
        }
    }

    /// Embed `query` and return up to `top_k` passages ordered by
    /// descending similarity. An empty result is valid, not an error.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedPassage>, Error> {
        let embedding = self.embed(query).await?;
        let passages = self.store.query(&embedding, self.top_k).await?;
        debug!(count = passages.len(), top_k = self.top_k, "Retrieved passages");
        Ok(passages)
    }

    /// Embed a single text through the configured embedding model.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, Error> {
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.embedding_model.clone(),
                inputs: vec![text.to_string()],
            })
            .await?;

        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::Retrieval(RetrievalError::EmbeddingFailed(
                    "Backend returned no embedding vectors".into(),
                ))
            })
    }
}
