//! Retrieval for Oxpecker: the in-memory vector store, the retriever
//! adapter (embed + top-k query), and document ingestion with
//! content-derived deduplication.

pub mod ingest;
pub mod retriever;
pub mod store;

pub use ingest::{DocumentIngestor, chunk_id, split_chunks};
pub use retriever::Retriever;
pub use store::InMemoryVectorStore;
